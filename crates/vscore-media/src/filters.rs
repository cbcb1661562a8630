//! FFmpeg filter-graph construction for the mux step.

/// Sample rate both audio streams are brought to before mixing.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// AAC bitrate of the muxed output.
pub const MIX_AUDIO_BITRATE: &str = "192k";

/// Filter-graph label carrying the mixed audio.
pub const MIX_OUTPUT_LABEL: &str = "[am]";

/// Common format both streams are converted to prior to amix.
fn mix_format() -> String {
    format!("aformat=sample_fmts=fltp:sample_rates={MIX_SAMPLE_RATE}:channel_layouts=stereo")
}

/// Gain filter for the generated track.
pub fn build_gain_filter(bgm_gain_db: f32) -> String {
    format!("volume={bgm_gain_db}dB")
}

/// Filter graph mixing the source audio (input 0) with the generated track
/// (input 1).
///
/// Both streams are converted to 48 kHz stereo float, the generated track
/// gets the requested gain, and amix runs without normalization so the
/// relative loudness set by the gain survives the mix.
pub fn build_mix_filter(bgm_gain_db: f32) -> String {
    let fmt = mix_format();
    let gain = build_gain_filter(bgm_gain_db);
    format!(
        "[0:a:0]{fmt}[a0];\
         [1:a:0]{gain},{fmt}[a1];\
         [a0][a1]amix=inputs=2:dropout_transition=0:normalize=0,\
         aresample={MIX_SAMPLE_RATE}{MIX_OUTPUT_LABEL}"
    )
}
