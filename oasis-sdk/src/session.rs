//! Device session: busy gate, command surface and plan execution
//!
//! One `Session` per device. The session owns the transport, the poll
//! synchronizer and a single command gate; every mutating path goes through
//! the gate, so the busy-exclusion invariant holds for all commands,
//! including ones added later.

use std::sync::Arc;

use oasis_api::{CloudApi, Command, DeviceStatus, DeviceTransport};
use oasis_state::{
    Connectivity, DeviceIdentity, DeviceSnapshot, SessionState, SyncConfig, SyncHandle,
    Synchronizer, TrackCatalog,
};
use tokio::sync::{watch, Mutex};
use tracing::warn;

use crate::enrich::{Enricher, ResolvedTrack};
use crate::error::{Result, SdkError};
use crate::queue::{self, QueuePrimitive, QueueRequest};

/// Caller-supplied LED settings; unset fields keep the device's current value
#[derive(Debug, Clone, Default)]
pub struct LedSettings {
    pub effect: Option<u8>,
    pub color: Option<String>,
    pub speed: Option<i16>,
    pub brightness: Option<u16>,
}

/// Queue state as last commanded within the current poll window
#[derive(Debug, Clone)]
struct QueueModel {
    queue: Vec<u32>,
    index: usize,
    /// Tracks inserted after the current entry since the model was refreshed
    inserted: usize,
}

/// Device queue as this session last commanded it
///
/// The snapshot does not reflect the session's own writes until the poll
/// after them, so consecutive queue mutations within one poll window must
/// compute device indices from the commands already sent. The model is
/// dropped as soon as a fresh snapshot is published.
struct CommandedQueue {
    state: watch::Receiver<SessionState>,
    model: Option<QueueModel>,
}

impl CommandedQueue {
    fn new(state: watch::Receiver<SessionState>) -> Self {
        Self { state, model: None }
    }

    /// Working model, preferring commands sent since the last poll
    fn current(&mut self) -> QueueModel {
        if self.state.has_changed().unwrap_or(false) {
            self.model = None;
        }
        if let Some(model) = &self.model {
            return model.clone();
        }
        let (queue, index) = self
            .state
            .borrow_and_update()
            .snapshot
            .as_ref()
            .map(|s| (s.queue.clone(), s.queue_index))
            .unwrap_or_default();
        QueueModel {
            queue,
            index,
            inserted: 0,
        }
    }

    fn record(&mut self, model: QueueModel) {
        self.model = Some(model);
    }

    /// Track the effect of one queue-mutating command on the model
    fn apply(&mut self, command: &Command) {
        match command {
            Command::SetQueue { ids } => {
                let mut model = self.current();
                model.queue = ids.clone();
                model.index = 0;
                model.inserted = 0;
                self.record(model);
            }
            Command::AppendToQueue { ids } => {
                let mut model = self.current();
                model.queue.extend(ids);
                self.record(model);
            }
            Command::MoveTrack { from, to } => {
                let mut model = self.current();
                if *from < model.queue.len() {
                    let id = model.queue.remove(*from);
                    model.queue.insert(usize::min(*to, model.queue.len()), id);
                }
                self.record(model);
            }
            Command::ChangeTrack { index } => {
                let mut model = self.current();
                model.index = *index;
                model.inserted = 0;
                self.record(model);
            }
            _ => {}
        }
    }
}

/// A live control session with one device
pub struct Session {
    name: String,
    transport: Arc<dyn DeviceTransport>,
    catalog: Arc<TrackCatalog>,
    enricher: Enricher,
    sync: SyncHandle,
    state: watch::Receiver<SessionState>,
    /// Serializes all mutating commands and tracks the queue they produced
    gate: Mutex<CommandedQueue>,
}

impl Session {
    /// Create a session and start its poll loop
    ///
    /// `cloud` is optional; without it, track results simply carry no
    /// metadata. Cloud failures never affect device control.
    pub fn new(
        name: impl Into<String>,
        transport: Arc<dyn DeviceTransport>,
        catalog: Arc<TrackCatalog>,
        cloud: Option<Arc<dyn CloudApi>>,
        config: SyncConfig,
    ) -> Self {
        let sync = Synchronizer::spawn(Arc::clone(&transport), config);
        let state = sync.subscribe();
        let gate = Mutex::new(CommandedQueue::new(sync.subscribe()));
        Self {
            name: name.into(),
            transport,
            catalog,
            enricher: Enricher::new(cloud),
            sync,
            state,
            gate,
        }
    }

    /// Device name used in busy rejections
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current session state (connectivity + snapshot)
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Last-known snapshot, if the session is not disconnected
    pub fn snapshot(&self) -> Option<DeviceSnapshot> {
        self.state.borrow().snapshot.clone()
    }

    /// Current connectivity
    pub fn connectivity(&self) -> Connectivity {
        self.state.borrow().connectivity
    }

    /// Device identity, once read
    pub fn identity(&self) -> Option<DeviceIdentity> {
        self.state.borrow().identity.clone()
    }

    /// Subscribe to state updates
    ///
    /// A command's completion is not reflected in the snapshot until the
    /// next poll; callers needing confirmation watch this channel.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.sync.subscribe()
    }

    /// Stop the poll loop
    pub fn shutdown(&self) {
        self.sync.shutdown();
    }

    /// Reject immediately when the snapshot says the device is busy
    fn ensure_not_busy(&self) -> Result<()> {
        if self.state.borrow().is_busy() {
            return Err(SdkError::DeviceBusy {
                device: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Gate and send a fixed command sequence
    async fn execute(&self, commands: &[Command]) -> Result<()> {
        self.ensure_not_busy()?;
        let mut gate = self.gate.lock().await;
        for command in commands {
            self.transport.send(command).await?;
            gate.apply(command);
        }
        Ok(())
    }

    /// Resolve a queue request, execute its plan, and enrich the result
    ///
    /// All-or-nothing: a resolution failure sends nothing. A `Replace` plan
    /// leaves the device playing the new queue (stopped first if it was
    /// already drawing). Enrichment runs strictly after the device commands
    /// succeed and cannot fail the call.
    pub async fn play_media(&self, request: QueueRequest) -> Result<Vec<ResolvedTrack>> {
        self.ensure_not_busy()?;
        let plan = queue::resolve(&request, &self.catalog)?;
        let was_playing = self.state.borrow().status() == Some(DeviceStatus::Playing);

        {
            let mut gate = self.gate.lock().await;
            let mut model = gate.current();

            for primitive in plan.primitives() {
                match primitive {
                    QueuePrimitive::SetQueue(ids) => {
                        if was_playing {
                            self.transport.send(&Command::Stop).await?;
                        }
                        self.transport
                            .send(&Command::SetQueue { ids: ids.clone() })
                            .await?;
                        model.queue = ids.clone();
                        model.index = 0;
                        model.inserted = 0;
                        // The device does not start a rewritten queue on its own
                        self.transport.send(&Command::Play).await?;
                    }
                    QueuePrimitive::Append(id) => {
                        self.transport
                            .send(&Command::AppendToQueue { ids: vec![*id] })
                            .await?;
                        model.queue.push(*id);
                    }
                    QueuePrimitive::InsertNext(id) => {
                        self.transport
                            .send(&Command::AppendToQueue { ids: vec![*id] })
                            .await?;
                        model.queue.push(*id);
                        let appended = model.queue.len() - 1;
                        let target =
                            usize::min(model.index + 1 + model.inserted, appended);
                        if appended != target {
                            self.transport
                                .send(&Command::MoveTrack {
                                    from: appended,
                                    to: target,
                                })
                                .await?;
                            model.queue.remove(appended);
                            model.queue.insert(target, *id);
                        }
                        model.inserted += 1;
                    }
                }
            }
            gate.record(model);
        }

        Ok(self.enricher.enrich(plan.track_ids()).await)
    }

    /// Start or resume drawing
    ///
    /// Live mode is stopped first; without a current track this is a no-op.
    pub async fn play(&self) -> Result<()> {
        let snapshot = self.snapshot();
        let mut commands = Vec::new();
        if snapshot.as_ref().map(|s| s.status) == Some(DeviceStatus::Live) {
            commands.push(Command::Stop);
        }
        if snapshot.as_ref().and_then(|s| s.current_track()).is_some() {
            commands.push(Command::Play);
        }
        if commands.is_empty() {
            return Ok(());
        }
        self.execute(&commands).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.execute(&[Command::Pause]).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.execute(&[Command::Stop]).await
    }

    pub async fn sleep(&self) -> Result<()> {
        self.execute(&[Command::Sleep]).await
    }

    /// Set the ball speed (valid 100..=400)
    pub async fn set_speed(&self, speed: u16) -> Result<()> {
        self.execute(&[Command::SetBallSpeed { speed }]).await
    }

    /// Apply LED settings, defaulting unset fields from the snapshot
    pub async fn set_led(&self, settings: LedSettings) -> Result<()> {
        let led = self.snapshot().map(|s| s.led);
        let command = Command::SetLed {
            effect: settings
                .effect
                .or_else(|| led.as_ref().map(|l| l.effect))
                .unwrap_or(0),
            color: settings
                .color
                .or_else(|| led.as_ref().and_then(|l| l.color.clone()))
                .unwrap_or_else(|| "#ffffff".to_string()),
            speed: settings
                .speed
                .or_else(|| led.as_ref().map(|l| l.speed))
                .unwrap_or(0),
            brightness: settings
                .brightness
                .or_else(|| led.as_ref().map(|l| l.brightness))
                .unwrap_or(0),
            max_brightness: led.as_ref().map_or(u16::MAX, |l| l.max_brightness),
        };
        self.execute(&[command]).await
    }

    /// Select a queue entry by index
    pub async fn change_track(&self, index: usize) -> Result<()> {
        let queue_len = self.snapshot().map_or(0, |s| s.queue.len());
        if index >= queue_len {
            return Err(SdkError::InvalidIndex { index });
        }
        self.execute(&[Command::ChangeTrack { index }]).await
    }

    /// Advance to the next queue entry, wrapping at the end
    pub async fn next_track(&self) -> Result<()> {
        let Some(snapshot) = self.snapshot() else {
            return Ok(());
        };
        if snapshot.queue.is_empty() {
            return Ok(());
        }
        let mut index = snapshot.queue_index + 1;
        if index >= snapshot.queue.len() {
            index = 0;
        }
        self.execute(&[Command::ChangeTrack { index }]).await
    }

    /// Step back to the previous queue entry, wrapping at the start
    pub async fn previous_track(&self) -> Result<()> {
        let Some(snapshot) = self.snapshot() else {
            return Ok(());
        };
        if snapshot.queue.is_empty() {
            return Ok(());
        }
        let index = match snapshot.queue_index {
            0 => snapshot.queue.len() - 1,
            i => i - 1,
        };
        self.execute(&[Command::ChangeTrack { index }]).await
    }

    /// Move a queue entry to another position
    pub async fn move_track(&self, from: usize, to: usize) -> Result<()> {
        let queue_len = self.snapshot().map_or(0, |s| s.queue.len());
        if from >= queue_len {
            return Err(SdkError::InvalidIndex { index: from });
        }
        if to >= queue_len {
            return Err(SdkError::InvalidIndex { index: to });
        }
        self.execute(&[Command::MoveTrack { from, to }]).await
    }

    /// Clear the device queue
    pub async fn clear_queue(&self) -> Result<()> {
        self.execute(&[Command::SetQueue { ids: Vec::new() }]).await
    }

    pub async fn set_repeat(&self, repeat: bool) -> Result<()> {
        self.execute(&[Command::SetRepeat { repeat }]).await
    }

    pub async fn set_autoplay(&self, option: u8) -> Result<()> {
        self.execute(&[Command::SetAutoplay { option }]).await
    }

    pub async fn set_autoclean(&self, enabled: bool) -> Result<()> {
        self.execute(&[Command::SetAutoclean { enabled }]).await
    }

    /// Trigger a software upgrade
    pub async fn upgrade(&self, beta: bool) -> Result<()> {
        self.execute(&[Command::Upgrade { beta }]).await
    }

    /// Reboot the device, fire-and-forget
    ///
    /// The device drops the connection while rebooting, so the response is
    /// not awaited; a send failure is logged and discarded.
    pub fn reboot(&self) {
        let transport = Arc::clone(&self.transport);
        let name = self.name.clone();
        tokio::spawn(async move {
            if let Err(e) = transport.send(&Command::Reboot).await {
                warn!(device = %name, "reboot command failed: {e}");
            }
        });
    }
}
