mod support;

use std::cell::RefCell;
use std::rc::Rc;

use support::wav::{sawtooth, wav_bytes};
use wavescope::config::VisualizerSettings;
use wavescope::decode::WavDecoder;
use wavescope::scheduler::ManualFrameClock;
use wavescope::surface::RasterSurface;
use wavescope::transport::{ClockTransport, SharedTransport};
use wavescope::visualizer::WaveformVisualizer;

#[test]
fn static_frame_exports_at_physical_resolution() {
    let temp = tempfile::tempdir().expect("create tempdir");
    let output = temp.path().join("frame.png");
    let transport: SharedTransport = Rc::new(RefCell::new(ClockTransport::new(3.0)));
    let mut visualizer = WaveformVisualizer::new(
        VisualizerSettings::default(),
        RasterSurface::new(),
        transport,
        Box::new(ManualFrameClock::new()),
    );
    visualizer.on_resize(400, 200, 2.0);
    visualizer
        .load_bytes(&wav_bytes(&sawtooth(3, 4_000), 1, 4_000), &WavDecoder)
        .expect("decode wav");

    visualizer.surface().save_png(&output).expect("save png");

    let image = image::open(&output).expect("open png").to_rgba8();
    assert_eq!(image.dimensions(), (800, 400));
    let background = VisualizerSettings::default().palette.background;
    let corner = image.get_pixel(1, 1).0;
    assert_eq!([corner[0], corner[1], corner[2]], background);
}
