//! Terminal endpoint ownership and raw-mode control.
//!
//! A [`Console`] is the pair of byte-oriented endpoints the shell engine
//! takes exclusive control of. The standard implementation,
//! [`TermConsole`], wraps a pair of file descriptors, switches the input
//! side into non-canonical mode with echo and signal generation off (so
//! Ctrl-C arrives as a byte), and restores the original attributes when
//! dropped. Tests and embedders with unusual transports implement the
//! trait themselves; see [`crate::mock::MockConsole`].

use std::io;
use std::os::unix::io::RawFd;

/// Exclusive handle on an input/output endpoint pair.
pub trait Console {
    /// Blocking read of a single byte. `Ok(None)` means end of input.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Non-blocking read of a single byte; `Ok(None)` when no input is
    /// pending. Used to peek for Ctrl-C during long output.
    fn poll_byte(&mut self) -> io::Result<Option<u8>>;

    /// Write the whole buffer to the output endpoint.
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Current window size as `(columns, rows)`, when known.
    fn window_size(&self) -> Option<(u16, u16)>;

    /// Whether the input endpoint is an interactive terminal.
    fn is_tty(&self) -> bool;

    /// Temporarily restore the endpoint's original attributes, e.g.
    /// before handing the terminal to a child process.
    fn release(&mut self) -> io::Result<()>;

    /// Reclaim the endpoint after [`Console::release`].
    fn acquire(&mut self) -> io::Result<()>;

    /// Raw input descriptor, when the endpoint has one.
    fn input_fd(&self) -> Option<RawFd> {
        None
    }

    /// Raw output descriptor, when the endpoint has one.
    fn output_fd(&self) -> Option<RawFd> {
        None
    }
}

/// Console over a pair of raw file descriptors.
pub struct TermConsole {
    input: RawFd,
    output: RawFd,
    saved_in: Option<libc::termios>,
    saved_out: Option<libc::termios>,
}

impl TermConsole {
    /// Take over `input` and `output`, switching `input` into
    /// non-canonical, no-echo, no-signal mode. Attributes are restored
    /// on drop. Endpoints that are not terminals (pipes, files) are
    /// accepted as-is.
    pub fn new(input: RawFd, output: RawFd) -> io::Result<Self> {
        if input < 0 || output < 0 {
            return Err(io::Error::from(io::ErrorKind::InvalidInput));
        }
        let mut console = Self {
            input,
            output,
            saved_in: tcgetattr(input),
            saved_out: tcgetattr(output),
        };
        console.acquire()?;
        Ok(console)
    }

    /// Take over stdin and stdout.
    pub fn stdio() -> io::Result<Self> {
        Self::new(libc::STDIN_FILENO, libc::STDOUT_FILENO)
    }
}

fn tcgetattr(fd: RawFd) -> Option<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(fd, &mut termios) } == 0 {
        Some(termios)
    } else {
        None
    }
}

fn tcsetattr(fd: RawFd, termios: &libc::termios) -> io::Result<()> {
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

impl Console for TermConsole {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            let n = unsafe { libc::read(self.input, buf.as_mut_ptr() as *mut libc::c_void, 1) };
            if n < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            if n == 0 {
                return Ok(None);
            }
            return Ok(Some(buf[0]));
        }
    }

    fn poll_byte(&mut self) -> io::Result<Option<u8>> {
        let mut poll_fd = libc::pollfd {
            fd: self.input,
            events: libc::POLLIN,
            revents: 0,
        };
        let ready = unsafe { libc::poll(&mut poll_fd, 1, 0) };
        if ready < 0 {
            return Err(io::Error::last_os_error());
        }
        if ready == 0 {
            return Ok(None);
        }
        self.read_byte()
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut rest = bytes;
        while !rest.is_empty() {
            let n = unsafe {
                libc::write(self.output, rest.as_ptr() as *const libc::c_void, rest.len())
            };
            if n < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            rest = &rest[n as usize..];
        }
        Ok(())
    }

    fn window_size(&self) -> Option<(u16, u16)> {
        let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
        let ret = unsafe { libc::ioctl(self.input, libc::TIOCGWINSZ, &mut ws) };
        if ret == 0 && ws.ws_col > 0 {
            Some((ws.ws_col, ws.ws_row))
        } else {
            None
        }
    }

    fn is_tty(&self) -> bool {
        unsafe { libc::isatty(self.input) == 1 }
    }

    fn release(&mut self) -> io::Result<()> {
        if let Some(saved) = &self.saved_in {
            tcsetattr(self.input, saved)?;
        }
        if let Some(saved) = &self.saved_out {
            tcsetattr(self.output, saved)?;
        }
        Ok(())
    }

    fn acquire(&mut self) -> io::Result<()> {
        let Some(saved) = &self.saved_in else {
            return Ok(());
        };
        let mut raw = *saved;
        raw.c_lflag &= !(libc::ICANON | libc::ECHO | libc::ECHONL | libc::ISIG);
        tcsetattr(self.input, &raw)
    }

    fn input_fd(&self) -> Option<RawFd> {
        Some(self.input)
    }

    fn output_fd(&self) -> Option<RawFd> {
        Some(self.output)
    }
}

impl Drop for TermConsole {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
