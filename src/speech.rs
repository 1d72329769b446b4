use std::io;
use std::process::{Child, Command, Stdio};

/// Text-to-speech collaborator for the source side of a card.
pub trait Speaker {
    fn speak(&mut self, text: &str) -> io::Result<()>;
}

/// Speaker that says nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn speak(&mut self, _text: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Speaks by spawning an external program with the text as last argument,
/// e.g. `espeak -v en-us -s 150`. A new utterance kills the previous one.
#[derive(Debug)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
    current: Option<Child>,
}

impl CommandSpeaker {
    /// `None` when `command` is empty.
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            current: None,
        })
    }

    fn stop_current(&mut self) {
        if let Some(mut child) = self.current.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&mut self, text: &str) -> io::Result<()> {
        self.stop_current();
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        self.current = Some(child);
        Ok(())
    }
}

impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        self.stop_current();
    }
}

/// Build the speaker for an optional configured command.
pub fn speaker_for(command: Option<&[String]>) -> Box<dyn Speaker> {
    match command.and_then(CommandSpeaker::new) {
        Some(speaker) => Box::new(speaker),
        None => Box::new(SilentSpeaker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_has_no_speaker() {
        assert!(CommandSpeaker::new(&[]).is_none());
    }

    #[test]
    fn missing_program_is_an_error() {
        let mut speaker =
            CommandSpeaker::new(&["tango-no-such-speech-program".to_string()]).unwrap();
        assert!(speaker.speak("hello").is_err());
    }

    #[test]
    fn silent_speaker_never_fails() {
        assert!(SilentSpeaker.speak("anything").is_ok());
    }
}
