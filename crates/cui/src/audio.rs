use mafia_core::{Ambience, SilentAmbience};
use std::path::Path;

pub fn night_ambience(path: Option<&Path>) -> Box<dyn Ambience> {
    match path {
        Some(path) => open_track(path),
        None => Box::new(SilentAmbience),
    }
}

#[cfg(feature = "audio")]
fn open_track(path: &Path) -> Box<dyn Ambience> {
    match track::NightTrack::open(path) {
        Ok(track) => Box::new(track),
        Err(_) => Box::new(SilentAmbience),
    }
}

#[cfg(not(feature = "audio"))]
fn open_track(_path: &Path) -> Box<dyn Ambience> {
    Box::new(SilentAmbience)
}

#[cfg(feature = "audio")]
mod track {
    use anyhow::{Context, Result};
    use mafia_core::{Ambience, AmbienceError};
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
    use std::fs::File;
    use std::io::BufReader;
    use std::path::{Path, PathBuf};

    pub struct NightTrack {
        path: PathBuf,
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sink: Option<Sink>,
    }

    impl NightTrack {
        pub fn open(path: &Path) -> Result<Self> {
            if !path.is_file() {
                anyhow::bail!("night track {} not found", path.display());
            }
            let (stream, handle) = OutputStream::try_default().context("open audio output")?;
            Ok(Self {
                path: path.to_path_buf(),
                _stream: stream,
                handle,
                sink: None,
            })
        }

        // Reopens the file on every start so a new night begins at 0:00.
        fn play(&mut self) -> Result<()> {
            let file = File::open(&self.path)
                .with_context(|| format!("open {}", self.path.display()))?;
            let source = Decoder::new(BufReader::new(file)).context("decode night track")?;
            let sink = Sink::try_new(&self.handle).context("create audio sink")?;
            sink.append(source.repeat_infinite());
            self.sink = Some(sink);
            Ok(())
        }
    }

    impl Ambience for NightTrack {
        fn is_available(&self) -> bool {
            true
        }

        fn start_loop(&mut self) -> Result<(), AmbienceError> {
            self.stop();
            self.play()
                .map_err(|err| AmbienceError(format!("{}: {err:#}", self.path.display())))
        }

        fn stop(&mut self) {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::night_ambience;
    use mafia_core::Ambience;
    use std::path::Path;

    #[test]
    fn silent_without_a_track() {
        assert!(!night_ambience(None).is_available());
        assert!(!night_ambience(Some(Path::new("missing/night.mp3"))).is_available());
    }
}
