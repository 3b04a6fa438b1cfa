use std::io::Cursor;

/// Encode interleaved float samples as an in-memory WAV file.
pub fn wav_bytes(samples: &[f32], channels: u16, sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("create wav writer");
    for &sample in samples {
        writer.write_sample(sample).expect("write wav sample");
    }
    writer.finalize().expect("finalize wav");
    cursor.into_inner()
}

/// Mono sawtooth in [-1, 1) lasting `seconds`.
pub fn sawtooth(seconds: u32, sample_rate: u32) -> Vec<f32> {
    (0..seconds * sample_rate)
        .map(|i| (i % 100) as f32 / 50.0 - 1.0)
        .collect()
}
