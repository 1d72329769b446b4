use std::io;
use std::process::{Child, Command, Stdio};

/// Keeps the screen awake while a session runs unpaused.
pub trait WakeLock {
    fn acquire(&mut self) -> io::Result<()>;
    fn release(&mut self) -> io::Result<()>;
    fn is_held(&self) -> bool;
}

/// No-op lock for hosts without an inhibitor.
#[derive(Debug, Default)]
pub struct NoWakeLock {
    held: bool,
}

impl WakeLock for NoWakeLock {
    fn acquire(&mut self) -> io::Result<()> {
        self.held = true;
        Ok(())
    }

    fn release(&mut self) -> io::Result<()> {
        self.held = false;
        Ok(())
    }

    fn is_held(&self) -> bool {
        self.held
    }
}

/// Holds an inhibitor process for as long as the lock is held, e.g.
/// `systemd-inhibit --what=idle sleep infinity` or `caffeinate -d`.
#[derive(Debug)]
pub struct CommandWakeLock {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl CommandWakeLock {
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            child: None,
        })
    }
}

impl WakeLock for CommandWakeLock {
    fn acquire(&mut self) -> io::Result<()> {
        if self.child.is_some() {
            return Ok(());
        }
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        self.child = Some(child);
        Ok(())
    }

    fn release(&mut self) -> io::Result<()> {
        if let Some(mut child) = self.child.take() {
            child.kill()?;
            child.wait()?;
        }
        Ok(())
    }

    fn is_held(&self) -> bool {
        self.child.is_some()
    }
}

impl Drop for CommandWakeLock {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

pub fn wake_lock_for(command: Option<&[String]>) -> Box<dyn WakeLock> {
    match command.and_then(CommandWakeLock::new) {
        Some(lock) => Box::new(lock),
        None => Box::new(NoWakeLock::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_wake_lock_tracks_state() {
        let mut lock = NoWakeLock::default();
        assert!(!lock.is_held());
        lock.acquire().unwrap();
        assert!(lock.is_held());
        lock.release().unwrap();
        assert!(!lock.is_held());
    }

    #[test]
    fn failed_spawn_leaves_lock_released() {
        let mut lock = CommandWakeLock::new(&["tango-no-such-inhibitor".to_string()]).unwrap();
        assert!(lock.acquire().is_err());
        assert!(!lock.is_held());
        assert!(lock.release().is_ok());
    }
}
