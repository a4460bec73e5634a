//! Canvas rendering probe

use crate::error::HostError;
use crate::host::Host;

use super::tail_chars;

/// Characters kept from the end of the canvas encoding
pub const CANVAS_FINGERPRINT_CHARS: usize = 50;

const TEXT: &str = "signal";
const FONT: &str = "14px Arial";
const BASELINE: &str = "top";

/// Render fixed text and return the tail of the encoded canvas.
///
/// `None` if the canvas cannot be created, drawn on or encoded.
pub fn canvas_fingerprint(host: &dyn Host) -> Option<String> {
    match render(host) {
        Ok(encoded) => Some(tail_chars(&encoded, CANVAS_FINGERPRINT_CHARS)),
        Err(e) => {
            log::debug!("canvas probe fell back to null: {e}");
            None
        }
    }
}

fn render(host: &dyn Host) -> Result<String, HostError> {
    let mut canvas = host.create_canvas_2d()?;
    canvas.set_text_baseline(BASELINE);
    canvas.set_font(FONT);
    canvas.fill_text(TEXT, 2.0, 2.0)?;
    canvas.to_data_url()
}
