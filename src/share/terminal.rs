use std::io::{self, IsTerminal, Write};

use anyhow::{bail, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

use super::{ShareChannel, ShareData};

/// Share channel for a terminal session.
///
/// There is no share sheet on a terminal. Clipboard copies go through the
/// OSC 52 escape sequence, which most terminal emulators forward to the
/// system clipboard; when stdout is not a terminal the copy fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalShare;

#[async_trait]
impl ShareChannel for TerminalShare {
    fn supports_native_share(&self) -> bool {
        false
    }

    async fn share_native(&self, _data: &ShareData) -> Result<()> {
        bail!("native sharing is not available in a terminal")
    }

    async fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        let mut stdout = io::stdout();
        if !stdout.is_terminal() {
            bail!("stdout is not a terminal");
        }
        stdout.write_all(osc52_sequence(text).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", BASE64_STANDARD.encode(text))
}
