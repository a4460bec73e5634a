//! Audio analysis probe
//!
//! The analyser is sampled immediately after the oscillator starts. On many
//! hosts this reads a near-silent spectrum; the value is still stable per
//! audio stack, which is all the fingerprint needs.

use crate::error::HostError;
use crate::host::Host;

use super::head_chars;

/// Frequency bins included in the fingerprint
pub const AUDIO_BIN_SAMPLES: usize = 10;

/// Maximum length of the serialized fingerprint
pub const AUDIO_FINGERPRINT_MAX_CHARS: usize = 50;

/// Synthesize a tone, sample the analyser and serialize the first bins.
///
/// Resolves to `None` when Web Audio is unsupported or any step fails.
pub async fn audio_fingerprint(host: &dyn Host) -> Option<String> {
    match sample_spectrum(host) {
        Ok(Some(bins)) => Some(serialize_bins(&bins)),
        Ok(None) => {
            log::debug!("audio probe: Web Audio unsupported");
            None
        }
        Err(e) => {
            log::debug!("audio probe fell back to null: {e}");
            None
        }
    }
}

fn sample_spectrum(host: &dyn Host) -> Result<Option<Vec<f32>>, HostError> {
    let Some(mut graph) = host.create_audio_context()? else {
        return Ok(None);
    };
    graph.connect_oscillator_to_analyser()?;
    graph.connect_analyser_to_destination()?;
    graph.start_oscillator(0.0)?;

    let mut data = vec![0.0_f32; graph.frequency_bin_count()];
    graph.get_float_frequency_data(&mut data)?;

    graph.stop_oscillator()?;
    graph.close()?;
    Ok(Some(data))
}

fn serialize_bins(bins: &[f32]) -> String {
    let joined = bins
        .iter()
        .take(AUDIO_BIN_SAMPLES)
        .map(|&v| js_number(f64::from(v)))
        .collect::<Vec<_>>()
        .join(",");
    head_chars(&joined, AUDIO_FINGERPRINT_MAX_CHARS)
}

/// Format a number the way a JavaScript engine stringifies it.
///
/// Magnitudes of 1e21 and above, or below 1e-6, print in full rather than in
/// JavaScript's exponent notation.
fn js_number(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if v == 0.0 {
        // covers -0
        "0".to_string()
    } else {
        format!("{v}")
    }
}
