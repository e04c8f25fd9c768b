use fskwave_core::{ChannelConfig, ModemError, Receiver, Synthesizer, TextReassembler};
use wasm_bindgen::prelude::*;

fn to_js(e: ModemError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn channel(mark: f32, space: f32, baud: f32, sample_rate: f32) -> ChannelConfig {
    ChannelConfig::default()
        .with_tones(mark, space)
        .with_baud_rate(baud)
        .with_sample_rate(sample_rate)
}

#[wasm_bindgen]
pub struct WasmTransmitter {
    inner: Synthesizer,
}

#[wasm_bindgen]
impl WasmTransmitter {
    #[wasm_bindgen(constructor)]
    pub fn new(mark: f32, space: f32, baud: f32, sample_rate: f32) -> Result<WasmTransmitter, JsValue> {
        Synthesizer::new(channel(mark, space, baud, sample_rate))
            .map(|inner| WasmTransmitter { inner })
            .map_err(to_js)
    }

    /// Synthesize text as UTF-8
    /// Returns a Float32Array ready for an AudioBuffer
    #[wasm_bindgen(js_name = encodeText)]
    pub fn encode_text(&self, text: &str) -> Vec<f32> {
        self.inner.synthesize_text(text)
    }

    /// Synthesize raw bytes from a Uint8Array
    #[wasm_bindgen]
    pub fn encode(&self, data: &[u8]) -> Vec<f32> {
        self.inner.synthesize(data)
    }

    #[wasm_bindgen(js_name = setAmplitude)]
    pub fn set_amplitude(&mut self, amplitude: f32) -> Result<(), JsValue> {
        self.inner = self.inner.clone().with_amplitude(amplitude).map_err(to_js)?;
        Ok(())
    }
}

/// Streaming receiver meant to be fed one render quantum at a time
#[wasm_bindgen]
pub struct WasmReceiver {
    inner: Receiver,
    text: TextReassembler,
    on_byte: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl WasmReceiver {
    #[wasm_bindgen(constructor)]
    pub fn new(mark: f32, space: f32, baud: f32, sample_rate: f32) -> Result<WasmReceiver, JsValue> {
        Receiver::new(channel(mark, space, baud, sample_rate))
            .map(|inner| WasmReceiver {
                inner,
                text: TextReassembler::new(),
                on_byte: None,
            })
            .map_err(to_js)
    }

    /// Feed a Float32Array block; returns the text completed by it (often empty)
    #[wasm_bindgen]
    pub fn process(&mut self, samples: &[f32]) -> String {
        let mut completed = String::new();
        let text = &mut self.text;
        let on_byte = self.on_byte.as_ref();
        self.inner.process(samples, |byte| {
            if let Some(callback) = on_byte {
                // A throwing callback must not stall the audio thread
                if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from(byte)) {
                    log::warn!("onByte callback threw for byte 0x{:02x}: {:?}", byte, e);
                }
            }
            if let Some(piece) = text.push(byte) {
                completed.push_str(&piece);
            }
        });
        completed
    }

    /// Register a function called with every decoded byte
    #[wasm_bindgen(js_name = setOnByte)]
    pub fn set_on_byte(&mut self, callback: Option<js_sys::Function>) {
        self.on_byte = callback;
    }

    /// Everything decoded since construction or the last reset
    #[wasm_bindgen]
    pub fn text(&self) -> String {
        self.text.text().to_string()
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.inner.reset();
        self.text.clear();
    }
}
