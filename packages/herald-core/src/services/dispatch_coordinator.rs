//! Dispatch of one sound to a set of devices, with playback onset aligned.
//!
//! Responsibilities:
//! - All-or-nothing validation of the request against the registry
//! - Latency probing and compensating delay computation
//! - Concurrent play fan-out with the delay carried in each request
//! - Per-device outcome logging
//!
//! # Phases
//!
//! 1. **Probe**: every target gets a health check concurrently; the
//!    coordinator waits for all of them.
//! 2. **Play**: every target gets `?sound_name=..&delay_ms=..` concurrently;
//!    the coordinator again waits for all of them.
//!
//! The device with the largest probed latency gets a delay of 0, the others
//! wait out the difference so that sound starts at roughly the same instant
//! everywhere.

use std::sync::Arc;

use futures::future::join_all;
use uuid::Uuid;

use crate::device::{play_url, ClientResponse, DeviceInvoker};
use crate::error::HeraldResult;
use crate::events::{DispatchEvent, EventEmitter};
use crate::registry::{Device, DeviceId, DeviceRegistry};
use crate::report::format_report;
use crate::state::SyncStrategy;
use crate::utils::{now_millis, validate_sound_name};

use super::health_prober::HealthProber;

/// A request to play one sound on an ordered list of devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    pub sound_name: String,
    pub device_ids: Vec<DeviceId>,
}

impl DispatchRequest {
    pub fn new(sound_name: impl Into<String>, device_ids: Vec<DeviceId>) -> Self {
        Self {
            sound_name: sound_name.into(),
            device_ids,
        }
    }
}

/// Computes `max(L) - L[i]` for every latency.
///
/// Never negative, and zero for the slowest device. An empty input yields an
/// empty output.
#[must_use]
pub fn compensating_delays(latencies_ms: &[u64]) -> Vec<u64> {
    let max_latency = latencies_ms.iter().copied().max().unwrap_or(0);
    latencies_ms.iter().map(|&l| max_latency - l).collect()
}

/// Stateless dispatch engine over the shared read-only registry.
pub struct DispatchCoordinator {
    registry: Arc<DeviceRegistry>,
    invoker: Arc<dyn DeviceInvoker>,
    prober: HealthProber,
    emitter: Arc<dyn EventEmitter>,
    strategy: SyncStrategy,
}

impl DispatchCoordinator {
    pub fn new(
        registry: Arc<DeviceRegistry>,
        invoker: Arc<dyn DeviceInvoker>,
        emitter: Arc<dyn EventEmitter>,
        strategy: SyncStrategy,
    ) -> Self {
        let prober = HealthProber::new(Arc::clone(&invoker));
        Self {
            registry,
            invoker,
            prober,
            emitter,
            strategy,
        }
    }

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    pub fn prober(&self) -> &HealthProber {
        &self.prober
    }

    /// Plays `request.sound_name` on every requested device.
    ///
    /// # Returns
    /// One [`ClientResponse`] per requested device, in request order.
    /// Per-device failures are inside the responses.
    ///
    /// # Errors
    /// Fails only when validation fails (bad sound name or unknown device),
    /// in which case no request has been sent to any device.
    pub async fn dispatch(&self, request: &DispatchRequest) -> HeraldResult<Vec<ClientResponse>> {
        validate_sound_name(&request.sound_name)?;
        let devices = self.registry.resolve(&request.device_ids)?;

        if devices.is_empty() {
            log::info!(
                "[Dispatch] [{}] requested with no devices, nothing to do",
                request.sound_name
            );
            return Ok(Vec::new());
        }

        let dispatch_id = Uuid::new_v4().to_string();
        log::info!(
            "[Dispatch] {} [{}] -> {:?}",
            dispatch_id,
            request.sound_name,
            request.device_ids
        );
        self.emitter.emit_dispatch(DispatchEvent::Started {
            dispatch_id: dispatch_id.clone(),
            sound_name: request.sound_name.clone(),
            devices: request.device_ids.clone(),
            timestamp: now_millis(),
        });

        let delays = self.plan_delays(&devices).await;
        log::info!(
            "[Dispatch] {} delays ({:?}): {:?}",
            dispatch_id,
            self.strategy,
            delays
        );
        self.emitter.emit_dispatch(DispatchEvent::SyncPlanned {
            dispatch_id: dispatch_id.clone(),
            delays_ms: delays.clone(),
            timestamp: now_millis(),
        });

        let responses = self
            .play_all(&devices, &request.sound_name, &delays)
            .await;

        let mut succeeded = 0;
        for (device, resp) in devices.iter().zip(&responses) {
            if resp.is_success() {
                succeeded += 1;
                log::info!(
                    "[Dispatch] {} response from {}: {}",
                    dispatch_id,
                    device.id,
                    resp
                );
            } else {
                log::error!(
                    "[Dispatch] {} non-2xx response from {}: {}",
                    dispatch_id,
                    device.id,
                    resp
                );
            }
            self.emitter.emit_dispatch(DispatchEvent::DeviceCompleted {
                dispatch_id: dispatch_id.clone(),
                device: device.id.clone(),
                status_code: resp.status_code,
                latency_ms: resp.latency_ms,
                success: resp.is_success(),
            });
        }

        self.emitter.emit_dispatch(DispatchEvent::Completed {
            dispatch_id,
            succeeded,
            failed: responses.len() - succeeded,
            timestamp: now_millis(),
        });

        Ok(responses)
    }

    /// Dispatches and renders the operator-facing report.
    pub async fn dispatch_report(&self, request: &DispatchRequest) -> HeraldResult<String> {
        let responses = self.dispatch(request).await?;
        let report = format_report(&request.device_ids, &responses);
        log::info!("[Dispatch] Report: {}", report.trim_end().replace('\n', " | "));
        Ok(report)
    }

    /// Chooses a delay per device, in device order.
    async fn plan_delays(&self, devices: &[Device]) -> Vec<u64> {
        match self.strategy {
            SyncStrategy::Static => devices
                .iter()
                .map(|d| d.sync_delay_ms.unwrap_or(0))
                .collect(),
            SyncStrategy::Probe => {
                let probes = self.prober.probe(devices).await;
                let latencies: Vec<u64> = probes.iter().map(|p| p.latency_ms).collect();
                compensating_delays(&latencies)
            }
        }
    }

    /// Sends the play command to every device concurrently.
    async fn play_all(
        &self,
        devices: &[Device],
        sound_name: &str,
        delays: &[u64],
    ) -> Vec<ClientResponse> {
        let futures = devices.iter().zip(delays).map(|(device, &delay_ms)| {
            let invoker = Arc::clone(&self.invoker);
            async move {
                let url = play_url(device, sound_name, delay_ms);
                invoker.invoke(device, &url).await
            }
        });
        join_all(futures).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::device::test_fixtures::{test_registry, ScriptedInvoker};
    use crate::error::HeraldError;
    use crate::events::NoopEventEmitter;
    use crate::state::Credentials;

    fn coordinator(
        registry: Arc<DeviceRegistry>,
        invoker: Arc<ScriptedInvoker>,
        strategy: SyncStrategy,
    ) -> DispatchCoordinator {
        DispatchCoordinator::new(registry, invoker, Arc::new(NoopEventEmitter), strategy)
    }

    fn ids(names: &[&str]) -> Vec<DeviceId> {
        names.iter().map(|n| n.to_string()).collect()
    }

    mod delays {
        use super::*;

        #[test]
        fn slowest_device_gets_zero() {
            assert_eq!(compensating_delays(&[50, 120]), vec![70, 0]);
            assert_eq!(compensating_delays(&[30, 30, 10]), vec![0, 0, 20]);
        }

        #[test]
        fn single_device_gets_zero() {
            assert_eq!(compensating_delays(&[4_321]), vec![0]);
        }

        #[test]
        fn empty_latencies_give_no_delays() {
            assert!(compensating_delays(&[]).is_empty());
        }

        #[test]
        fn delays_are_bounded_by_the_spread() {
            let latencies = [5, 5000, 17, 0, 999];
            let delays = compensating_delays(&latencies);
            assert!(delays.iter().any(|&d| d == 0));
            for (l, d) in latencies.iter().zip(&delays) {
                assert_eq!(l + d, 5000);
            }
        }
    }

    #[tokio::test]
    async fn play_requests_carry_compensating_delays() {
        let registry = test_registry(&["X", "Y"]);
        let invoker = Arc::new(
            ScriptedInvoker::new()
                .probe_latency("X", 50)
                .probe_latency("Y", 120),
        );
        let coordinator = coordinator(registry, invoker.clone(), SyncStrategy::Probe);

        let responses = coordinator
            .dispatch(&DispatchRequest::new("chime.mp3", ids(&["X", "Y"])))
            .await
            .unwrap();

        assert_eq!(responses.len(), 2);
        let plays = invoker.play_calls();
        let x = plays.iter().find(|c| c.device == "X").unwrap();
        let y = plays.iter().find(|c| c.device == "Y").unwrap();
        assert_eq!(x.url.as_str(), "http://x.local/?sound_name=chime.mp3&delay_ms=70");
        assert_eq!(y.url.as_str(), "http://y.local/?sound_name=chime.mp3&delay_ms=0");
    }

    #[tokio::test]
    async fn probe_phase_finishes_before_play_phase() {
        let registry = test_registry(&["a", "b", "c"]);
        let invoker = Arc::new(ScriptedInvoker::new());
        let coordinator = coordinator(registry, invoker.clone(), SyncStrategy::Probe);

        coordinator
            .dispatch(&DispatchRequest::new("bell.mp3", ids(&["a", "b", "c"])))
            .await
            .unwrap();

        let calls = invoker.calls();
        assert_eq!(calls.len(), 6);
        assert!(calls[..3].iter().all(|c| c.is_health_check()));
        assert!(calls[3..].iter().all(|c| !c.is_health_check()));
    }

    #[tokio::test(start_paused = true)]
    async fn results_keep_request_order() {
        let registry = test_registry(&["a", "b", "c"]);
        let invoker = Arc::new(
            ScriptedInvoker::new()
                .hold("a", Duration::from_millis(300))
                .play_response("a", ClientResponse::new("from a", 200, 1))
                .play_response("b", ClientResponse::new("from b", 200, 1))
                .play_response("c", ClientResponse::new("from c", 200, 1)),
        );
        let coordinator = coordinator(registry, invoker, SyncStrategy::Probe);

        let responses = coordinator
            .dispatch(&DispatchRequest::new("bell.mp3", ids(&["c", "a", "b"])))
            .await
            .unwrap();

        let texts: Vec<_> = responses.iter().map(|r| r.response_text.as_str()).collect();
        assert_eq!(texts, ["from c", "from a", "from b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn both_phases_run_devices_concurrently() {
        let registry = test_registry(&["a", "b", "c"]);
        let second = Duration::from_secs(1);
        let invoker = Arc::new(
            ScriptedInvoker::new()
                .hold("a", second)
                .hold("b", second)
                .hold("c", second),
        );
        let coordinator = coordinator(registry, invoker.clone(), SyncStrategy::Probe);

        let start = tokio::time::Instant::now();
        coordinator
            .dispatch(&DispatchRequest::new("bell.mp3", ids(&["a", "b", "c"])))
            .await
            .unwrap();
        let elapsed = start.elapsed();

        // One second per phase; sequential calls would take six
        assert!(elapsed >= Duration::from_secs(2), "took {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(3), "took {:?}", elapsed);
        assert_eq!(invoker.play_calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn play_waits_for_the_slowest_health_check() {
        let registry = test_registry(&["fast", "slow"]);
        let hold = Duration::from_millis(500);
        let invoker = Arc::new(ScriptedInvoker::new().hold("slow", hold));
        let coordinator = coordinator(registry, invoker.clone(), SyncStrategy::Probe);

        let start = tokio::time::Instant::now();
        coordinator
            .dispatch(&DispatchRequest::new("bell.mp3", ids(&["fast", "slow"])))
            .await
            .unwrap();

        let calls = invoker.calls();
        assert_eq!(calls.len(), 4);
        assert!(calls[..2].iter().all(|c| c.is_health_check()));
        let plays = invoker.play_calls();
        assert_eq!(plays.len(), 2);
        for play in &plays {
            assert!(
                play.at >= start + hold,
                "{} played {:?} after start",
                play.device,
                play.at - start
            );
        }
    }

    #[tokio::test]
    async fn unknown_device_fails_without_network_calls() {
        let registry = test_registry(&["hall"]);
        let invoker = Arc::new(ScriptedInvoker::new());
        let coordinator = coordinator(registry, invoker.clone(), SyncStrategy::Probe);

        let err = coordinator
            .dispatch(&DispatchRequest::new("bell.mp3", ids(&["hall", "attic"])))
            .await
            .unwrap_err();

        assert!(matches!(err, HeraldError::UnknownDevice { ref device, .. } if device == "attic"));
        assert!(invoker.calls().is_empty());
    }

    #[tokio::test]
    async fn traversal_sound_name_fails_without_network_calls() {
        let registry = test_registry(&["hall"]);
        let invoker = Arc::new(ScriptedInvoker::new());
        let coordinator = coordinator(registry, invoker.clone(), SyncStrategy::Probe);

        let err = coordinator
            .dispatch(&DispatchRequest::new("../secret", ids(&["hall"])))
            .await
            .unwrap_err();

        assert!(matches!(err, HeraldError::InvalidRequest(_)));
        assert!(invoker.calls().is_empty());
    }

    #[tokio::test]
    async fn one_failing_device_does_not_affect_others() {
        let registry = test_registry(&["hall", "lobby", "yard"]);
        let invoker = Arc::new(
            ScriptedInvoker::new()
                .play_response("lobby", ClientResponse::transport_failure("timed out", 5000))
                .play_response("yard", ClientResponse::new("queued", 200, 8)),
        );
        let coordinator = coordinator(registry, invoker, SyncStrategy::Probe);

        let responses = coordinator
            .dispatch(&DispatchRequest::new("bell.mp3", ids(&["hall", "lobby", "yard"])))
            .await
            .unwrap();

        assert_eq!(responses[0], ClientResponse::new("ok", 200, 1));
        assert_eq!(responses[1].status_code, 500);
        assert_eq!(responses[1].response_text, "timed out");
        assert_eq!(responses[2], ClientResponse::new("queued", 200, 8));
    }

    #[tokio::test]
    async fn failed_probes_still_dispatch() {
        let registry = test_registry(&["hall", "lobby"]);
        let invoker = Arc::new(
            ScriptedInvoker::new()
                .probe_response("hall", ClientResponse::transport_failure("refused", 2))
                .probe_response("lobby", ClientResponse::transport_failure("refused", 9)),
        );
        let coordinator = coordinator(registry, invoker.clone(), SyncStrategy::Probe);

        let responses = coordinator
            .dispatch(&DispatchRequest::new("bell.mp3", ids(&["hall", "lobby"])))
            .await
            .unwrap();

        assert_eq!(responses.len(), 2);
        let plays = invoker.play_calls();
        assert_eq!(plays.len(), 2);
        let hall = plays.iter().find(|c| c.device == "hall").unwrap();
        assert_eq!(hall.query("delay_ms").as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn single_device_is_played_without_delay() {
        let registry = test_registry(&["hall"]);
        let invoker = Arc::new(ScriptedInvoker::new().probe_latency("hall", 250));
        let coordinator = coordinator(registry, invoker.clone(), SyncStrategy::Probe);

        coordinator
            .dispatch(&DispatchRequest::new("bell.mp3", ids(&["hall"])))
            .await
            .unwrap();

        assert_eq!(invoker.play_calls()[0].query("delay_ms").as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn empty_request_makes_no_calls() {
        let registry = test_registry(&["hall"]);
        let invoker = Arc::new(ScriptedInvoker::new());
        let coordinator = coordinator(registry, invoker.clone(), SyncStrategy::Probe);

        let responses = coordinator
            .dispatch(&DispatchRequest::new("bell.mp3", Vec::new()))
            .await
            .unwrap();

        assert!(responses.is_empty());
        assert!(invoker.calls().is_empty());
    }

    #[tokio::test]
    async fn static_strategy_uses_hints_and_skips_probes() {
        let creds = Credentials::new("agent", "secret");
        let devices = vec![
            Device::new("hall", "http://hall.local/", creds.clone())
                .unwrap()
                .with_sync_delay(40),
            Device::new("lobby", "http://lobby.local/", creds).unwrap(),
        ];
        let registry = Arc::new(DeviceRegistry::from_devices(devices).unwrap());
        let invoker = Arc::new(ScriptedInvoker::new());
        let coordinator = coordinator(registry, invoker.clone(), SyncStrategy::Static);

        coordinator
            .dispatch(&DispatchRequest::new("bell.mp3", ids(&["hall", "lobby"])))
            .await
            .unwrap();

        let calls = invoker.calls();
        assert!(calls.iter().all(|c| !c.is_health_check()));
        let hall = calls.iter().find(|c| c.device == "hall").unwrap();
        let lobby = calls.iter().find(|c| c.device == "lobby").unwrap();
        assert_eq!(hall.query("delay_ms").as_deref(), Some("40"));
        assert_eq!(lobby.query("delay_ms").as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn dispatch_report_lists_every_device() {
        let registry = test_registry(&["hall", "lobby"]);
        let invoker = Arc::new(
            ScriptedInvoker::new().play_response("lobby", ClientResponse::new("busy", 409, 4)),
        );
        let coordinator = coordinator(registry, invoker, SyncStrategy::Probe);

        let report = coordinator
            .dispatch_report(&DispatchRequest::new("bell.mp3", ids(&["hall", "lobby"])))
            .await
            .unwrap();

        assert!(report.contains("Device [hall]: queued for playback"));
        assert!(report.contains("Device [lobby]: failed, HTTP status: 409, error: busy"));
    }
}
