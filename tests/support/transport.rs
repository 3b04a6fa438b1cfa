use std::cell::RefCell;
use std::rc::Rc;

use wavescope::transport::Transport;

/// Transport whose position only moves when the test says so.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    pub time: f64,
    pub duration: f64,
    pub playing: bool,
    pub seeks: Vec<f64>,
}

impl ScriptedTransport {
    pub fn shared(duration: f64) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            duration,
            ..Self::default()
        }))
    }

    /// Jump to the end and stop, as a media element does before `ended`.
    pub fn finish(&mut self) {
        self.time = self.duration;
        self.playing = false;
    }
}

impl Transport for ScriptedTransport {
    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek(&mut self, seconds: f64) {
        self.seeks.push(seconds);
        self.time = seconds.clamp(0.0, self.duration);
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}
