//! Single-owner controller for one dataset on one page.
//!
//! A `Session` owns the loaded collection, the frame list, the sequence
//! position and the color mode. UI events are applied synchronously; the only
//! suspension point is [`Session::load`].

use compute::{FeatureFilter, FilterError, ScaleError, Statistics};
use formats::{FeatureCollection, LoadError};
use layers::proportional::{FrameSymbology, ProportionalLayer, ProportionalLayerSnapshot};
use layers::{Layer, LayerId};
use layers::radius::ScaleAnchor;
use layers::symbology::{ColorMode, LegendEntry, class_legend};
use runtime::{EventBus, Frame, FrameSet, SequenceError, SequenceIndex, UiEvent};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::{FrameSource, SequencerConfig};
use crate::source::DataSource;

pub const STATUS_LOADING: &str = "Loading data…";
pub const STATUS_FAILED: &str = "❌ Failed to load data. Open console for details.";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    NotStarted,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug)]
pub enum SessionError {
    Load(LoadError),
    Scale(ScaleError),
    Sequence(SequenceError),
    Filter(FilterError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Load(e) => write!(f, "load failed: {e}"),
            SessionError::Scale(e) => write!(f, "scale failed: {e}"),
            SessionError::Sequence(e) => write!(f, "sequence error: {e}"),
            SessionError::Filter(e) => write!(f, "filter error: {e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Load(e) => Some(e),
            SessionError::Scale(e) => Some(e),
            SessionError::Sequence(e) => Some(e),
            SessionError::Filter(e) => Some(e),
        }
    }
}

impl From<LoadError> for SessionError {
    fn from(e: LoadError) -> Self {
        SessionError::Load(e)
    }
}

impl From<ScaleError> for SessionError {
    fn from(e: ScaleError) -> Self {
        SessionError::Scale(e)
    }
}

impl From<SequenceError> for SessionError {
    fn from(e: SequenceError) -> Self {
        SessionError::Sequence(e)
    }
}

impl From<FilterError> for SessionError {
    fn from(e: FilterError) -> Self {
        SessionError::Filter(e)
    }
}

/// State the panel mirrors: slider, frame label, legend toggle, status line.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlsView {
    /// Inclusive slider maximum; `None` until frames are known.
    pub slider_max: Option<usize>,
    pub slider_value: Option<usize>,
    pub frame_label: Option<String>,
    pub color_mode: ColorMode,
    pub legend_visible: bool,
    pub status_message: String,
}

/// Everything the map needs to draw the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub layer: LayerId,
    pub index: usize,
    pub frame: Frame,
    pub label: String,
    pub attribute: String,
    pub feature_count: usize,
    pub symbols: ProportionalLayerSnapshot,
    pub legend: Option<Vec<LegendEntry>>,
}

/// Data that only exists after a successful load; swapped in as a whole.
#[derive(Debug)]
struct Loaded {
    collection: FeatureCollection,
    anchor: Option<ScaleAnchor>,
}

#[derive(Debug)]
pub struct Session {
    config: SequencerConfig,
    filter: FeatureFilter,
    layer: ProportionalLayer,
    frames: Option<FrameSet>,
    sequence: Option<SequenceIndex>,
    loaded: Option<Loaded>,
    color_mode: ColorMode,
    status: LoadStatus,
    status_message: String,
}

impl Session {
    /// Fails when the configuration names an empty frame list.
    pub fn new(config: SequencerConfig) -> Result<Self, SessionError> {
        let frames = config.frames.fixed_frames();
        let sequence = match &frames {
            Some(f) => Some(SequenceIndex::new(f.len())?),
            None => None,
        };
        Ok(Self {
            filter: config.frames.filter(),
            layer: ProportionalLayer::new(1, config.style.clone()),
            color_mode: config.color_mode,
            frames,
            sequence,
            loaded: None,
            status: LoadStatus::NotStarted,
            status_message: String::new(),
            config,
        })
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn is_ready(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn frames(&self) -> Option<&FrameSet> {
        self.frames.as_ref()
    }

    pub fn collection(&self) -> Option<&FeatureCollection> {
        self.loaded.as_ref().map(|l| &l.collection)
    }

    pub fn anchor(&self) -> Option<ScaleAnchor> {
        self.loaded.as_ref().and_then(|l| l.anchor)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn current_index(&self) -> Option<usize> {
        self.sequence.map(|s| s.index())
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.as_ref()?.get(self.current_index()?)
    }

    /// Fetches and prepares the dataset. On failure the session keeps no
    /// partial data and the status line carries a single failure message.
    pub async fn load(&mut self, source: &dyn DataSource) -> Result<(), SessionError> {
        let path = self.config.dataset_path.clone();
        let location = source.locate(&path);
        info!("loading dataset from {location}");
        self.status = LoadStatus::Loading;
        self.status_message = STATUS_LOADING.to_string();

        let result = match source.fetch(&path).await {
            Ok(collection) => self.prepare(collection),
            Err(e) => Err(SessionError::from(e)),
        };

        match result {
            Ok((loaded, frames, sequence)) => {
                info!(
                    "loaded {} features and {} frames from {location}",
                    loaded.collection.len(),
                    frames.len()
                );
                self.loaded = Some(loaded);
                self.frames = Some(frames);
                self.sequence = Some(sequence);
                self.status = LoadStatus::Ready;
                self.status_message.clear();
                Ok(())
            }
            Err(e) => {
                error!("error loading GeoJSON from {location}: {e}");
                // Nothing from an earlier load may outlive a failed one.
                self.loaded = None;
                self.frames = self.config.frames.fixed_frames();
                self.sequence = self
                    .frames
                    .as_ref()
                    .and_then(|f| SequenceIndex::new(f.len()).ok());
                self.status = LoadStatus::Failed;
                self.status_message = STATUS_FAILED.to_string();
                Err(e)
            }
        }
    }

    fn prepare(
        &self,
        collection: FeatureCollection,
    ) -> Result<(Loaded, FrameSet, SequenceIndex), SessionError> {
        let frames = match &self.config.frames {
            FrameSource::ScanAttributes { needle } => {
                let names = collection
                    .features
                    .first()
                    .map(|f| f.properties.keys().map(String::as_str).collect::<Vec<_>>())
                    .unwrap_or_default();
                FrameSet::scan_attributes(names, needle)
            }
            other => other.fixed_frames().unwrap_or_else(FrameSet::months),
        };

        let mut sequence = SequenceIndex::new(frames.len())?;
        // Keep the position the user scrubbed to while the load was pending.
        if let Some(current) = self.sequence {
            if current.index() < sequence.len() {
                sequence.set_index(current.index())?;
            }
        }

        let anchor = if self.config.style.radius.needs_anchor() {
            let attributes: Vec<&str> = match &self.config.frames {
                FrameSource::Months { value_field, .. } => vec![value_field.as_str()],
                _ => frames.attribute_names(),
            };
            Some(Statistics::scale_anchor(&collection, attributes.as_slice())?)
        } else {
            None
        };

        Ok((Loaded { collection, anchor }, frames, sequence))
    }

    /// Applies one UI event and renders the resulting frame.
    ///
    /// Returns `Ok(None)` while no data is loaded; controls still move.
    pub fn handle(&mut self, event: UiEvent) -> Result<Option<FrameView>, SessionError> {
        self.apply(event)?;
        self.render()
    }

    /// Applies every queued event, then renders once. A rejected event is
    /// logged and skipped; the rest of the queue still applies.
    pub fn pump(&mut self, bus: &mut EventBus) -> Result<Option<FrameView>, SessionError> {
        for event in bus.drain() {
            let described = format!("{event:?}");
            if let Err(e) = self.apply(event) {
                warn!("skipping queued {described}: {e}");
            }
        }
        self.render()
    }

    fn apply(&mut self, event: UiEvent) -> Result<(), SessionError> {
        if let UiEvent::ColorMode(value) = &event {
            self.color_mode = ColorMode::from_radio_value(value);
            debug!("color mode set to {:?}", self.color_mode);
            return Ok(());
        }

        let Some(sequence) = self.sequence.as_mut() else {
            warn!("ignoring {event:?}: frames are not known yet");
            return Ok(());
        };
        match event {
            UiEvent::StepForward => {
                sequence.forward();
            }
            UiEvent::StepBackward => {
                sequence.backward();
            }
            UiEvent::SliderInput(index) => sequence.set_index(index)?,
            UiEvent::ColorMode(_) => {}
        }
        debug!("frame index now {}", sequence.index());
        Ok(())
    }

    /// Symbols for the current frame, or `None` if data is not ready.
    pub fn render(&self) -> Result<Option<FrameView>, SessionError> {
        let (Some(loaded), Some(frame), Some(index)) =
            (self.loaded.as_ref(), self.current_frame(), self.current_index())
        else {
            return Ok(None);
        };

        let selection = self.filter.select(&loaded.collection, frame)?;
        let symbols = self.layer.frame_snapshot(
            &selection.features,
            FrameSymbology {
                attribute: selection.attribute,
                anchor: loaded.anchor,
                color_mode: self.color_mode,
            },
        );

        Ok(Some(FrameView {
            layer: self.layer.id(),
            index,
            frame: frame.clone(),
            label: frame.label(),
            attribute: selection.attribute.to_string(),
            feature_count: selection.features.len(),
            symbols,
            legend: self
                .color_mode
                .shows_legend()
                .then(|| class_legend(&self.config.legend_unit)),
        }))
    }

    /// The current frame's features as a GeoJSON FeatureCollection.
    pub fn frame_geojson(&self) -> Result<Option<Value>, SessionError> {
        let (Some(loaded), Some(frame)) = (self.loaded.as_ref(), self.current_frame()) else {
            return Ok(None);
        };
        let selection = self.filter.select(&loaded.collection, frame)?;
        Ok(Some(FeatureCollection::subset_to_geojson_value(
            selection.features,
        )))
    }

    pub fn controls(&self) -> ControlsView {
        ControlsView {
            slider_max: self.sequence.map(|s| s.last()),
            slider_value: self.current_index(),
            frame_label: self.current_frame().map(Frame::label),
            color_mode: self.color_mode,
            legend_visible: self.color_mode.shows_legend(),
            status_message: self.status_message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadStatus, STATUS_FAILED, Session, SessionError};
    use crate::config::SequencerConfig;
    use crate::source::InlineSource;
    use compute::ScaleError;
    use formats::LoadError;
    use layers::LayerId;
    use layers::symbology::{ColorClass, ColorMode};
    use pretty_assertions::assert_eq;
    use runtime::{EventBus, SequenceError, UiEvent};

    const CRASHES: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "id": "c1", "properties": {"REPORTDATE": "1/5/2021", "TOTAL_VEHICLES": 2},
         "geometry": {"type": "Point", "coordinates": [-77.03, 38.90]}},
        {"type": "Feature", "id": "c2", "properties": {"REPORTDATE": "2021-01-20T14:00:00Z", "TOTAL_VEHICLES": 9},
         "geometry": {"type": "Point", "coordinates": [-77.01, 38.91]}},
        {"type": "Feature", "id": "c3", "properties": {"REPORTDATE": "3/3/2021", "TOTAL_VEHICLES": 1},
         "geometry": {"type": "Point", "coordinates": [-77.02, 38.88]}},
        {"type": "Feature", "id": "c4", "properties": {"REPORTDATE": "unknown", "TOTAL_VEHICLES": 4},
         "geometry": {"type": "Point", "coordinates": [-77.00, 38.89]}}
    ]}"#;

    const CITIES: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"City": "Tokyo", "Pop_1985": 30.3, "Pop_1990": 32.5},
         "geometry": {"type": "Point", "coordinates": [139.8, 35.7]}},
        {"type": "Feature", "properties": {"City": "Lagos", "Pop_1985": 5, "Pop_1990": 7.2},
         "geometry": {"type": "Point", "coordinates": [3.4, 6.5]}}
    ]}"#;

    async fn loaded(config: SequencerConfig, payload: &str) -> Session {
        let mut session = Session::new(config).expect("session");
        session
            .load(&InlineSource::new(payload))
            .await
            .expect("load");
        session
    }

    #[tokio::test]
    async fn crashes_are_filtered_by_month() {
        let session = loaded(SequencerConfig::dc_crashes(), CRASHES).await;
        assert_eq!(session.status(), LoadStatus::Ready);
        assert_eq!(session.status_message(), "");

        let view = session.render().unwrap().expect("frame");
        assert_eq!(view.label, "Month: January");
        assert_eq!(view.layer, LayerId(1));
        assert_eq!(view.feature_count, 2);
        let ids: Vec<_> = view
            .symbols
            .markers
            .iter()
            .map(|m| m.feature_id.as_deref())
            .collect();
        assert_eq!(ids, vec![Some("c1"), Some("c2")]);
        assert_eq!(view.symbols.markers[1].radius, 10.0);
        assert_eq!(view.symbols.markers[1].fill_color, "#FF5722");
        assert_eq!(
            view.symbols.markers[0].popup.as_deref(),
            Some("<b>Date:</b> 1/5/2021<br><b>Total Vehicles:</b> 2")
        );
        assert!(view.legend.is_none());
    }

    #[tokio::test]
    async fn stepping_wraps_in_both_directions() {
        let mut session = loaded(SequencerConfig::dc_crashes(), CRASHES).await;

        let view = session.handle(UiEvent::StepBackward).unwrap().expect("frame");
        assert_eq!(view.index, 11);
        assert_eq!(view.label, "Month: December");
        assert!(view.symbols.markers.is_empty());

        let view = session.handle(UiEvent::StepForward).unwrap().expect("frame");
        assert_eq!(view.index, 0);

        let view = session.handle(UiEvent::SliderInput(2)).unwrap().expect("frame");
        assert_eq!(view.label, "Month: March");
        assert_eq!(view.feature_count, 1);
    }

    #[tokio::test]
    async fn slider_outside_frames_is_rejected() {
        let mut session = loaded(SequencerConfig::dc_crashes(), CRASHES).await;
        let err = session.handle(UiEvent::SliderInput(12)).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Sequence(SequenceError::OutOfRange { index: 12, len: 12 })
        ));
        assert_eq!(session.current_index(), Some(0));
    }

    #[test]
    fn controls_move_before_data_arrives() {
        let mut session = Session::new(SequencerConfig::dc_crashes()).unwrap();
        assert_eq!(session.status(), LoadStatus::NotStarted);
        assert!(session.handle(UiEvent::StepForward).unwrap().is_none());

        let controls = session.controls();
        assert_eq!(controls.slider_max, Some(11));
        assert_eq!(controls.slider_value, Some(1));
        assert_eq!(controls.frame_label.as_deref(), Some("Month: February"));
        assert!(session.frame_geojson().unwrap().is_none());
    }

    #[test]
    fn scanned_frames_ignore_events_until_loaded() {
        let mut session = Session::new(SequencerConfig::mega_cities()).unwrap();
        assert!(session.handle(UiEvent::StepForward).unwrap().is_none());
        assert!(session.handle(UiEvent::SliderInput(40)).unwrap().is_none());
        let controls = session.controls();
        assert_eq!(controls.slider_max, None);
        assert_eq!(controls.frame_label, None);
    }

    #[tokio::test]
    async fn position_survives_the_load() {
        let mut session = Session::new(SequencerConfig::dc_crashes()).unwrap();
        session.handle(UiEvent::SliderInput(2)).unwrap();
        session.load(&InlineSource::new(CRASHES)).await.unwrap();
        let view = session.render().unwrap().expect("frame");
        assert_eq!(view.label, "Month: March");
    }

    #[tokio::test]
    async fn html_body_marks_the_load_failed() {
        let mut session = Session::new(SequencerConfig::dc_crashes()).unwrap();
        let err = session
            .load(&InlineSource::new("<!doctype html><title>404</title>"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Load(LoadError::HtmlBody)));
        assert_eq!(session.status(), LoadStatus::Failed);
        assert_eq!(session.status_message(), STATUS_FAILED);
        assert!(!session.is_ready());
        assert!(session.render().unwrap().is_none());
    }

    #[tokio::test]
    async fn mega_cities_scan_and_scale() {
        let session = loaded(SequencerConfig::mega_cities(), CITIES).await;
        let names = session.frames().unwrap().attribute_names();
        assert_eq!(names, vec!["Pop_1985", "Pop_1990"]);
        assert_eq!(session.anchor().map(|a| a.value()), Some(5.0));

        let view = session.render().unwrap().expect("frame");
        assert_eq!(view.label, "1985");
        let lagos = &view.symbols.markers[1];
        assert!((lagos.radius - 1.0083 * 5.0).abs() < 1e-9);
        assert!(view.symbols.markers[0].radius > lagos.radius);
        assert_eq!(
            view.symbols.markers[0].popup.as_deref(),
            Some("<p><b>City:</b> Tokyo</p><p><b>Population in 1985:</b> 30.3 million</p>")
        );
    }

    #[tokio::test]
    async fn no_matching_attributes_fails_the_load() {
        let mut session = Session::new(SequencerConfig::mega_cities()).unwrap();
        let payload = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"City": "Nowhere"}, "geometry": null}
        ]}"#;
        let err = session.load(&InlineSource::new(payload)).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Sequence(SequenceError::EmptyFrameList)
        ));
        assert_eq!(session.status(), LoadStatus::Failed);
        assert!(session.frames().is_none());
    }

    #[tokio::test]
    async fn non_positive_minimum_fails_the_load() {
        let mut session = Session::new(SequencerConfig::mega_cities()).unwrap();
        let payload = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"City": "Ghost", "Pop_2000": 0},
             "geometry": {"type": "Point", "coordinates": [0, 0]}}
        ]}"#;
        let err = session.load(&InlineSource::new(payload)).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Scale(ScaleError::NonPositiveAnchor(_))
        ));
    }

    #[tokio::test]
    async fn class_mode_recolors_and_shows_legend() {
        let mut session = loaded(SequencerConfig::dc_crashes(), CRASHES).await;
        let view = session
            .handle(UiEvent::ColorMode("class".to_string()))
            .unwrap()
            .expect("frame");
        assert_eq!(session.color_mode(), ColorMode::Class);
        assert_eq!(
            view.symbols.markers[1].fill_color,
            ColorClass::classify(Some(9.0)).hex()
        );
        let legend = view.legend.expect("legend");
        assert_eq!(legend.len(), 9);
        assert_eq!(legend[0].label, "0–1 Vehicles");
        assert!(session.controls().legend_visible);

        session
            .handle(UiEvent::ColorMode("single".to_string()))
            .unwrap();
        assert!(!session.controls().legend_visible);
    }

    #[tokio::test]
    async fn pump_applies_queued_events_then_renders_once() {
        let mut session = loaded(SequencerConfig::dc_crashes(), CRASHES).await;
        let mut bus = EventBus::new();
        bus.emit(UiEvent::StepForward);
        bus.emit(UiEvent::StepForward);
        bus.emit(UiEvent::StepBackward);
        let view = session.pump(&mut bus).unwrap().expect("frame");
        assert_eq!(view.label, "Month: February");
        assert!(bus.events().is_empty());
    }

    #[tokio::test]
    async fn pump_keeps_going_past_a_rejected_event() {
        let mut session = loaded(SequencerConfig::dc_crashes(), CRASHES).await;
        let mut bus = EventBus::new();
        bus.emit(UiEvent::SliderInput(99));
        bus.emit(UiEvent::StepForward);
        bus.emit(UiEvent::ColorMode("class".to_string()));
        let view = session.pump(&mut bus).unwrap().expect("frame");
        assert_eq!(view.index, 1);
        assert_eq!(session.color_mode(), ColorMode::Class);
        assert!(view.legend.is_some());
        assert!(bus.events().is_empty());
    }

    #[tokio::test]
    async fn failed_reload_drops_the_previous_dataset() {
        let mut session = loaded(SequencerConfig::mega_cities(), CITIES).await;
        assert!(session.render().unwrap().is_some());

        session
            .load(&InlineSource::new("<html>gone</html>"))
            .await
            .unwrap_err();
        assert_eq!(session.status(), LoadStatus::Failed);
        assert_eq!(session.status_message(), STATUS_FAILED);
        assert!(!session.is_ready());
        assert!(session.anchor().is_none());
        assert!(session.frames().is_none());
        assert!(session.render().unwrap().is_none());
        assert_eq!(session.controls().slider_max, None);
    }

    #[tokio::test]
    async fn failed_reload_keeps_fixed_frames_but_no_features() {
        let mut session = loaded(SequencerConfig::dc_crashes(), CRASHES).await;
        session.handle(UiEvent::SliderInput(4)).unwrap();
        session
            .load(&InlineSource::new("<html>gone</html>"))
            .await
            .unwrap_err();
        assert!(session.collection().is_none());
        assert!(session.render().unwrap().is_none());
        assert_eq!(session.controls().slider_max, Some(11));
        assert_eq!(session.current_index(), Some(0));
    }

    #[tokio::test]
    async fn frame_geojson_holds_only_the_current_subset() {
        let session = loaded(SequencerConfig::dc_crashes(), CRASHES).await;
        let value = session.frame_geojson().unwrap().expect("geojson");
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"].as_array().map(Vec::len), Some(2));
    }
}
