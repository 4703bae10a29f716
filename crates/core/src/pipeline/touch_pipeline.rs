use std::time::{Duration, Instant};

use crate::detection::domain::fingertip_localizer::FingertipLocalizer;
use crate::detection::domain::hand_localizer::HandLocalizer;
use crate::detection::domain::observation::{HandObservation, PointObservation, ShadowObservation};
use crate::detection::domain::shadow_localizer::ShadowLocalizer;
use crate::detection::infrastructure::contour_fingertip_localizer::ContourFingertipLocalizer;
use crate::detection::infrastructure::difference_shadow_localizer::DifferenceShadowLocalizer;
use crate::detection::infrastructure::skin_color_hand_localizer::SkinColorHandLocalizer;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::config::{ConfigError, TouchConfig};
use crate::shared::frame::Frame;
use crate::touch::domain::key_layout::KeyLayout;
use crate::touch::domain::touch_event::TouchEvent;
use crate::touch::domain::touch_state::TouchState;
use crate::touch::domain::touch_validator::{TouchInput, TouchValidator};

/// Everything the pipeline learned about one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    pub timestamp: Duration,
    pub hand: Option<HandObservation>,
    pub fingertip: Option<PointObservation>,
    pub shadow: Option<ShadowObservation>,
    pub state: TouchState,
    pub event: Option<TouchEvent>,
}

/// Frame → hand → fingertip → shadow → touch state.
///
/// Each frame runs start to finish before the next. The only state kept
/// across frames is the shadow reference and the validator's debounce
/// progress.
pub struct TouchPipeline {
    hand: Box<dyn HandLocalizer>,
    fingertip: Box<dyn FingertipLocalizer>,
    shadow: Box<dyn ShadowLocalizer>,
    validator: TouchValidator,
    layout: Box<dyn KeyLayout>,
    logger: Box<dyn PipelineLogger>,
    expected_frames: Option<usize>,
    processed: usize,
}

impl TouchPipeline {
    pub fn new(
        hand: Box<dyn HandLocalizer>,
        fingertip: Box<dyn FingertipLocalizer>,
        shadow: Box<dyn ShadowLocalizer>,
        validator: TouchValidator,
        layout: Box<dyn KeyLayout>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            hand,
            fingertip,
            shadow,
            validator,
            layout,
            logger,
            expected_frames: None,
            processed: 0,
        }
    }

    /// Builds the standard stages from a validated configuration.
    pub fn from_config(
        config: &TouchConfig,
        layout: Box<dyn KeyLayout>,
        logger: Box<dyn PipelineLogger>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            Box::new(SkinColorHandLocalizer::new(config.hand.clone())),
            Box::new(ContourFingertipLocalizer::new(
                config.edges.clone(),
                config.contour.clone(),
            )),
            Box::new(DifferenceShadowLocalizer::new(
                config.shadow.clone(),
                config.contour.clone(),
            )),
            TouchValidator::new(config.validator.clone()),
            layout,
            logger,
        ))
    }

    /// Frame count reported to the logger's progress, when known.
    pub fn set_expected_frames(&mut self, total: Option<usize>) {
        self.expected_frames = total;
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn has_reference(&self) -> bool {
        self.shadow.has_reference()
    }

    pub fn capture_reference(&mut self, frame: &Frame) {
        self.shadow.capture_reference(frame);
    }

    pub fn calibrate(&mut self, frame: &Frame) -> bool {
        self.hand.calibrate(frame)
    }

    pub fn logger(&self) -> &dyn PipelineLogger {
        self.logger.as_ref()
    }

    pub fn logger_mut(&mut self) -> &mut dyn PipelineLogger {
        self.logger.as_mut()
    }

    pub fn process(&mut self, frame: &Frame) -> FrameReport {
        let hand = timed(&mut *self.logger, "hand", || self.hand.locate(frame));
        if let Some(h) = &hand {
            self.logger.metric("hand_confidence", h.confidence);
        }

        let (fingertip, shadow) = match &hand {
            Some(h) => {
                let fingertip = timed(&mut *self.logger, "fingertip", || {
                    self.fingertip.locate(frame, &h.region)
                });
                let shadow = timed(&mut *self.logger, "shadow", || {
                    self.shadow.locate(frame, &h.region)
                });
                (fingertip, shadow)
            }
            None => (None, None),
        };
        if let Some(s) = &shadow {
            self.logger.metric("shadow_threshold", s.threshold as f64);
        }

        let input = TouchInput {
            hand_confidence: hand.map(|h| h.confidence),
            fingertip: fingertip.filter(|f| f.valid).map(|f| f.position),
            shadow: shadow.map(|s| s.position()),
            timestamp: frame.timestamp(),
            frame_index: frame.index(),
        };
        let update = timed(&mut *self.logger, "validate", || {
            self.validator.validate(&input, self.layout.as_ref())
        });
        if let Some(event) = &update.event {
            self.logger.touch(event);
        }

        self.processed += 1;
        self.logger.progress(self.processed, self.expected_frames);

        FrameReport {
            frame_index: frame.index(),
            timestamp: frame.timestamp(),
            hand,
            fingertip,
            shadow,
            state: update.state,
            event: update.event,
        }
    }
}

fn timed<T>(logger: &mut dyn PipelineLogger, stage: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    logger.timing(stage, start.elapsed().as_secs_f64() * 1000.0);
    out
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::shared::frame::test_support::{fill_rect, fill_triangle, rgb_frame, solid_rgb};
    use crate::shared::config::ShadowPolarity;
    use crate::shared::point::Point;
    use crate::shared::region::Region;
    use crate::touch::domain::touch_state::InvalidReason;
    use crate::touch::infrastructure::rect_key_layout::RectKeyLayout;
    use approx::assert_relative_eq;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingLogger {
        stages: Arc<Mutex<Vec<String>>>,
        touches: Arc<Mutex<usize>>,
    }

    impl PipelineLogger for RecordingLogger {
        fn progress(&mut self, _processed: usize, _total: Option<usize>) {}

        fn timing(&mut self, stage: &str, _duration_ms: f64) {
            self.stages.lock().unwrap().push(stage.to_string());
        }

        fn metric(&mut self, _name: &str, _value: f64) {}

        fn touch(&mut self, _event: &TouchEvent) {
            *self.touches.lock().unwrap() += 1;
        }
    }

    fn blank(millis: u64, index: u64) -> Frame {
        rgb_frame(solid_rgb(10, 10, [0, 0, 0]), 10, 10, millis, index)
    }

    #[test]
    fn test_without_reference_shadow_is_missing() {
        let mut pipeline = null_stub_pipeline();
        let report = pipeline.process(&blank(0, 0));
        assert!(report.hand.is_some());
        assert!(report.shadow.is_none());
        assert_eq!(
            report.state,
            TouchState::Invalid {
                reason: InvalidReason::NoShadow
            }
        );
    }

    #[test]
    fn test_touch_after_debounce_emits_one_event() {
        let logger = RecordingLogger::default();
        let mut pipeline = stub_pipeline(Box::new(logger.clone()));
        pipeline.capture_reference(&blank(0, 0));

        let reports: Vec<FrameReport> = (0..4)
            .map(|i| pipeline.process(&blank(i * 40, i)))
            .collect();

        assert!(matches!(reports[0].state, TouchState::Debouncing { frames: 1, .. }));
        assert!(matches!(reports[1].state, TouchState::Debouncing { frames: 2, .. }));
        let event = reports[2].event.as_ref().expect("touch at 80 ms");
        // 0.8 hand confidence × (1 - 0.2 / 1.0).
        assert_relative_eq!(event.confidence, 0.64, epsilon = 1e-9);
        assert!(reports[3].state.is_touching());
        assert!(reports[3].event.is_none());
        assert_eq!(*logger.touches.lock().unwrap(), 1);
        assert_eq!(pipeline.processed(), 4);
    }

    #[test]
    fn test_every_stage_is_timed() {
        let logger = RecordingLogger::default();
        let mut pipeline = stub_pipeline(Box::new(logger.clone()));
        pipeline.capture_reference(&blank(0, 0));
        pipeline.process(&blank(0, 0));
        assert_eq!(
            *logger.stages.lock().unwrap(),
            vec!["hand", "fingertip", "shadow", "validate"]
        );
    }

    #[test]
    fn test_no_hand_skips_later_stages() {
        let logger = RecordingLogger::default();
        let mut pipeline = TouchPipeline::new(
            Box::new(StubHand(None)),
            Box::new(StubFingertip(Point::new(5.0, 5.0))),
            Box::new(StubShadow {
                at: Point::new(5.0, 5.0),
                referenced: true,
            }),
            TouchValidator::default(),
            Box::new(OneKey),
            Box::new(logger.clone()),
        );
        let report = pipeline.process(&blank(0, 0));
        assert_eq!(report.state, TouchState::Idle);
        assert!(report.fingertip.is_none());
        assert_eq!(*logger.stages.lock().unwrap(), vec!["hand", "validate"]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = TouchConfig::default();
        config.validator.touch_threshold = 5.0;
        let built = TouchPipeline::from_config(
            &config,
            Box::new(OneKey),
            Box::new(crate::pipeline::pipeline_logger::NullPipelineLogger),
        );
        assert!(built.is_err());
    }

    const SKIN: [u8; 3] = [220, 160, 130];

    /// 320x240 scene on a dark gray table: an upward finger with its tip
    /// at (160, 100) and, to its right, a pointed shadow tipped at
    /// (215, 110). Table pixels carry faint darkening noise.
    fn scene(millis: u64, index: u64) -> Frame {
        let (w, h) = (320u32, 240u32);
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                let v = if (x + y) % 2 == 0 { 52 } else { 60 };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        fill_triangle(&mut data, w, (215, 110), 150, 15.0, [0, 0, 0]);
        fill_rect(&mut data, w, &Region::new(200, 150, 31, 60), [0, 0, 0]);
        fill_triangle(&mut data, w, (160, 100), 160, 30.0, SKIN);
        fill_rect(&mut data, w, &Region::new(130, 160, 61, 60), SKIN);
        rgb_frame(data, w, h, millis, index)
    }

    #[test]
    fn test_real_stages_locate_finger_and_shadow() {
        let mut config = TouchConfig::default();
        config.shadow.polarity = ShadowPolarity::DarkerOnly;
        let layout = RectKeyLayout::grid(Region::new(0, 0, 320, 240), 10, 4, &[]);
        let mut pipeline = TouchPipeline::from_config(
            &config,
            Box::new(layout),
            Box::new(crate::pipeline::pipeline_logger::NullPipelineLogger),
        )
        .unwrap();
        pipeline.capture_reference(&rgb_frame(solid_rgb(320, 240, [60, 60, 60]), 320, 240, 0, 0));

        let report = pipeline.process(&scene(33, 1));

        let hand = report.hand.expect("hand");
        assert!(hand.region.contains(Point::new(160.0, 150.0)));
        let tip = report.fingertip.expect("fingertip").position;
        assert!((tip.x - 160.0).abs() < 6.0, "{tip:?}");
        assert!(tip.y > 95.0 && tip.y < 120.0, "{tip:?}");
        let shadow = report.shadow.expect("shadow").position();
        assert!((shadow.x - 215.0).abs() < 4.0, "{shadow:?}");
        assert!((shadow.y - 110.0).abs() < 8.0, "{shadow:?}");
        // Finger and shadow are far apart: not even hovering.
        assert_eq!(report.state, TouchState::Idle);
        assert!(report.event.is_none());
    }
}
