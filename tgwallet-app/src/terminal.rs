use log::*;
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use std::sync::Mutex;

use tgwallet_api::domain::InitData;

use crate::host::Host;

/// Host over a line-oriented terminal. An empty answer accepts the default,
/// end of input cancels.
pub struct TerminalHost<R, W> {
    init_data: InitData,
    io: Mutex<(R, W)>,
}

impl TerminalHost<BufReader<Stdin>, Stdout> {
    pub fn stdio(init_data: InitData) -> Self {
        TerminalHost::new(init_data, BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalHost<R, W> {
    pub fn new(init_data: InitData, reader: R, writer: W) -> Self {
        TerminalHost {
            init_data,
            io: Mutex::new((reader, writer)),
        }
    }

    /// Prints a block of text, used for the rendered screen
    pub fn print(&self, text: &str) {
        if let Ok(mut io) = self.io.lock() {
            if let Err(e) = writeln!(io.1, "{text}").and_then(|_| io.1.flush()) {
                error!("Terminal write failed: {e}");
            }
        }
    }

    pub fn into_inner(self) -> Option<(R, W)> {
        self.io.into_inner().ok()
    }
}

impl<R, W> Host for TerminalHost<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn init_data(&self) -> InitData {
        self.init_data.clone()
    }

    /// Blocks the calling thread on stdin. The binary runs one handler at a
    /// time, so holding a runtime worker while the user types is accepted.
    fn prompt(&self, message: &str, default: &str) -> Option<String> {
        let mut io = self.io.lock().ok()?;
        let (reader, writer) = &mut *io;
        write!(writer, "{message} [{default}] ").ok()?;
        writer.flush().ok()?;
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                let answer = line.trim_end_matches(|c| c == '\n' || c == '\r');
                if answer.is_empty() {
                    Some(default.to_owned())
                } else {
                    Some(answer.to_owned())
                }
            }
            Err(e) => {
                error!("Terminal read failed: {e}");
                None
            }
        }
    }

    fn show_alert(&self, message: &str) {
        self.print(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn host(input: &str) -> TerminalHost<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalHost::new(
            InitData::default(),
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
        )
    }

    fn output(host: TerminalHost<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        let (_, out) = host.into_inner().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn empty_answer_takes_default() {
        let host = host("\nRUB\r\n");
        assert_eq!(host.prompt("Currency", "usdt").as_deref(), Some("usdt"));
        assert_eq!(host.prompt("Currency", "usdt").as_deref(), Some("RUB"));
        assert_eq!(output(host), "Currency [usdt] Currency [usdt] ");
    }

    #[test]
    fn end_of_input_cancels() {
        let host = host("");
        assert_eq!(host.prompt("Amount", "10"), None);
    }

    #[test]
    fn alerts_go_to_output() {
        let host = host("");
        host.show_alert("✅ Done");
        assert_eq!(output(host), "✅ Done\n");
    }
}
