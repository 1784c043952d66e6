//! The console as a character device.
//!
//! Reads block until a whole line is committed (or the buffer fills), then
//! hand out bytes up to and including the newline. An end-of-input byte ends
//! the read; if some bytes were already copied it is left in the ring so the
//! next read returns 0.

use kiln_common::keys::EOF_BYTE;
use kiln_common::ConsoleError;
use kiln_hal::{Scheduler, Serial, TextDisplay};
use log::debug;

use super::Console;
use crate::dev::CharDevice;
use crate::sync::sleep_releasing;

impl<D, S, K> CharDevice for Console<D, S, K>
where
    D: TextDisplay + Send,
    S: Serial + Send,
    K: Scheduler + Sync,
{
    fn read(&self, dst: &mut [u8]) -> Result<usize, ConsoleError> {
        let mut n = 0;
        let mut state = self.lock();
        while n < dst.len() {
            while !state.line().has_committed() {
                if self.scheduler().killed() {
                    debug!("console: reader killed after {} bytes", n);
                    return Err(ConsoleError::Killed);
                }
                sleep_releasing(self.scheduler(), self.input_channel(), state);
                state = self.lock();
            }

            let Some(c) = state.line_mut().pop_committed() else {
                continue;
            };
            if c == EOF_BYTE {
                if n > 0 {
                    state.line_mut().unread();
                }
                break;
            }
            dst[n] = c;
            n += 1;
            if c == b'\n' {
                break;
            }
        }
        Ok(n)
    }

    fn write(&self, src: &[u8]) -> Result<usize, ConsoleError> {
        self.lock().write_bytes(src);
        Ok(src.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleConfig;
    use crate::testutil::{CaptureSerial, InlineScheduler, MemoryDisplay};
    use kiln_common::keys;

    type TestConsole = Console<MemoryDisplay, CaptureSerial, InlineScheduler>;

    fn console() -> TestConsole {
        Console::new(
            MemoryDisplay::new(),
            CaptureSerial::new(),
            InlineScheduler::new(),
            &ConsoleConfig::default(),
        )
    }

    fn type_codes(c: &TestConsole, codes: &[i32]) {
        let mut it = codes.iter().copied();
        c.intr(|| it.next().unwrap_or(-1));
    }

    fn type_str(c: &TestConsole, s: &str) {
        let codes: std::vec::Vec<i32> = s.bytes().map(i32::from).collect();
        type_codes(c, &codes);
    }

    #[test]
    fn test_read_stops_after_newline() {
        let c = console();
        type_str(&c, "ab\ncd\n");
        let mut buf = [0u8; 16];
        assert_eq!(c.read(&mut buf), Ok(3));
        assert_eq!(&buf[..3], b"ab\n");
        assert_eq!(c.read(&mut buf), Ok(3));
        assert_eq!(&buf[..3], b"cd\n");
    }

    #[test]
    fn test_short_buffer_reads_partial_line() {
        let c = console();
        type_str(&c, "hello\n");
        let mut buf = [0u8; 2];
        assert_eq!(c.read(&mut buf), Ok(2));
        assert_eq!(&buf, b"he");
        let mut rest = [0u8; 8];
        assert_eq!(c.read(&mut rest), Ok(4));
        assert_eq!(&rest[..4], b"llo\n");
    }

    #[test]
    fn test_eof_after_data_is_pushed_back() {
        let c = console();
        type_str(&c, "ab");
        type_codes(&c, &[keys::EOF]);
        let mut buf = [0u8; 8];
        assert_eq!(c.read(&mut buf), Ok(2));
        assert_eq!(c.read(&mut buf), Ok(0));
    }

    #[test]
    fn test_eof_alone_reads_zero() {
        let c = console();
        type_codes(&c, &[keys::EOF]);
        let mut buf = [0u8; 8];
        assert_eq!(c.read(&mut buf), Ok(0));
        c.inspect(|s| assert!(!s.line().has_committed()));
    }

    #[test]
    fn test_killed_reader_gets_error() {
        let c = console();
        type_str(&c, "partial");
        c.scheduler().kill();
        let mut buf = [0u8; 8];
        assert_eq!(c.read(&mut buf), Err(ConsoleError::Killed));
        c.inspect(|s| assert_eq!(s.line().edit(), 7));
    }

    #[test]
    fn test_write_echoes_everything() {
        let c = console();
        assert_eq!(c.write(b"$ "), Ok(2));
        c.inspect(|s| assert_eq!(s.sink().serial().bytes(), b"$ "));
    }
}
