//! Inbound processing: list, fetch attachments, write, confirm.

use std::collections::BTreeMap;

use edi_platform::Transmission;
use edi_transport::object::METADATA_FILENAME;
use edi_transport::{FinalizeError, InboundTransport, Object};
use tracing::{error, info};

use crate::engine::{Engine, TickReport};
use crate::error::{EngineError, EngineResult};
use crate::ids::random_id;

impl Engine {
    pub(crate) async fn process_inbound(
        &self,
        config_id: &str,
        transport: &dyn InboundTransport,
        report: &mut TickReport,
    ) {
        if let Err(err) = self.process_inbound_batch(config_id, transport, report).await {
            Self::record_failure("inbound", config_id, &err, report);
        }
    }

    async fn process_inbound_batch(
        &self,
        config_id: &str,
        transport: &dyn InboundTransport,
        report: &mut TickReport,
    ) -> EngineResult<()> {
        let transmissions = self
            .guard
            .cancellable(
                "list_transmissions",
                config_id,
                self.platform.list_transmissions(config_id),
            )
            .await?;

        for transmission in transmissions {
            self.receive_attachments(transport, &transmission, report)
                .await?;

            let content = match self
                .guard
                .cancellable(
                    "download_transmission",
                    &transmission.id,
                    self.platform.download_transmission(&transmission),
                )
                .await
            {
                Ok(content) => content,
                Err(err) if err.is_cancelled() => return Err(err),
                Err(err) => {
                    report.failures += 1;
                    error!(
                        config_id,
                        transmission_id = %transmission.id,
                        url = %transmission.url,
                        error = ?err,
                        "transmission download failed; skipping"
                    );
                    continue;
                }
            };

            // From here on the transmission is written and confirmed even if
            // shutdown is requested meanwhile.
            self.store_and_confirm(transport, &transmission, content)
                .await?;
            report.received_messages += 1;
            info!(config_id, transmission_id = %transmission.id, "transmission received");
        }
        Ok(())
    }

    async fn receive_attachments(
        &self,
        transport: &dyn InboundTransport,
        transmission: &Transmission,
        report: &mut TickReport,
    ) -> EngineResult<()> {
        let Some(processor) = transport
            .attachment_processor()
            .filter(|processor| processor.handle_attachments())
        else {
            return Ok(());
        };
        let Some(tid) = transmission.tid() else {
            return Ok(());
        };

        let references = self
            .guard
            .cancellable(
                "list_message_attachments",
                tid,
                self.platform.list_message_attachments(tid),
            )
            .await?;
        for reference in references {
            if !processor.accepts_attachment_url(&reference.url) {
                return Err(EngineError::RejectedUrl { url: reference.url });
            }
            let payload = self
                .guard
                .cancellable(
                    "download_attachment",
                    &reference.url,
                    self.platform.download_attachment(&reference),
                )
                .await?;
            if payload.filename.is_empty() {
                return Err(EngineError::MissingFilename { url: reference.url });
            }
            let mut metadata = BTreeMap::new();
            metadata.insert(METADATA_FILENAME.to_string(), payload.filename);
            let object = Object::with_metadata(random_id(), payload.content, metadata);
            self.guard
                .cancellable(
                    "process_attachment",
                    &reference.url,
                    processor.process_attachment(object),
                )
                .await?;
            report.received_attachments += 1;
        }
        Ok(())
    }

    async fn store_and_confirm(
        &self,
        transport: &dyn InboundTransport,
        transmission: &Transmission,
        content: Vec<u8>,
    ) -> EngineResult<()> {
        let object = Object::with_metadata(
            transmission.id.clone(),
            content,
            transmission.metadata.clone(),
        );
        let finalizer = transport.finalizer();
        let retained = finalizer.map(|_| object.clone());

        let mut outcome = self
            .guard
            .bounded(
                "process_message",
                &transmission.id,
                transport.process_message(object),
            )
            .await;
        if outcome.is_ok() {
            outcome = self
                .guard
                .bounded(
                    "confirm_transmission",
                    &transmission.id,
                    self.platform.confirm_transmission(&transmission.id),
                )
                .await;
        }

        if let (Some(finalizer), Some(object)) = (finalizer, retained) {
            let cause = outcome.as_ref().err().map(|err| err as &FinalizeError);
            if let Err(finalize_err) = self
                .guard
                .bounded(
                    "finalize",
                    &transmission.id,
                    finalizer.finalize(&object, cause),
                )
                .await
            {
                error!(
                    transmission_id = %transmission.id,
                    error = ?finalize_err,
                    "inbound finalize failed"
                );
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex, PoisonError};
    use std::time::Duration;

    use async_trait::async_trait;
    use edi_platform::{AttachmentPayload, MessageAttachment, Platform, Transmission};
    use edi_test_support::platform::{FakePlatform, PlatformCall};
    use edi_transport::{
        AttachmentProcessor, InboundTransport, Object, OutboundTransport, TransportResult,
    };

    use crate::engine::Engine;
    use crate::options::EngineOptions;

    type Stored = Arc<Mutex<Vec<(String, Object)>>>;

    /// Inbound transport recording every stored object.
    struct Recorder {
        attachments: bool,
        whitelist: Option<&'static str>,
        stored: Stored,
    }

    impl Recorder {
        fn new(attachments: bool) -> Self {
            Self {
                attachments,
                whitelist: None,
                stored: Stored::default(),
            }
        }

        fn push(&self, kind: &str, object: Object) {
            self.stored
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((kind.to_string(), object));
        }
    }

    #[async_trait]
    impl InboundTransport for Recorder {
        async fn process_message(&self, object: Object) -> TransportResult<()> {
            self.push("message", object);
            Ok(())
        }

        fn attachment_processor(&self) -> Option<&dyn AttachmentProcessor> {
            Some(self)
        }
    }

    #[async_trait]
    impl AttachmentProcessor for Recorder {
        async fn process_attachment(&self, object: Object) -> TransportResult<()> {
            self.push("attachment", object);
            Ok(())
        }

        fn handle_attachments(&self) -> bool {
            self.attachments
        }

        fn accepts_attachment_url(&self, url: &str) -> bool {
            self.whitelist.is_none_or(|prefix| url.starts_with(prefix))
        }
    }

    fn transmission(id: &str, tid: Option<&str>) -> Transmission {
        let mut metadata = BTreeMap::new();
        if let Some(tid) = tid {
            metadata.insert("TID".to_string(), tid.to_string());
        }
        Transmission {
            id: id.to_string(),
            url: format!("fake://{id}"),
            metadata,
            ..Transmission::default()
        }
    }

    fn engine_with(platform: &Arc<FakePlatform>, transport: Recorder) -> (Engine, Stored) {
        let stored = Arc::clone(&transport.stored);
        let outbounds: BTreeMap<String, Box<dyn OutboundTransport>> = BTreeMap::new();
        let mut inbounds: BTreeMap<String, Box<dyn InboundTransport>> = BTreeMap::new();
        inbounds.insert("cfgB".to_string(), Box::new(transport));
        let platform: Arc<dyn Platform> = Arc::clone(platform) as Arc<dyn Platform>;
        let engine = Engine::new(
            platform,
            outbounds,
            inbounds,
            EngineOptions {
                run_wait_time: Duration::from_secs(60),
                operation_timeout: Duration::from_millis(200),
            },
        );
        (engine, stored)
    }

    fn kinds(stored: &Stored) -> Vec<String> {
        stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(kind, object)| format!("{kind}:{}", object.filename()))
            .collect()
    }

    fn attachment(url: &str) -> MessageAttachment {
        MessageAttachment {
            url: url.to_string(),
            item_id: "a1".to_string(),
        }
    }

    fn payload(filename: &str) -> AttachmentPayload {
        AttachmentPayload {
            content: b"PDFDATA".to_vec(),
            filename: filename.to_string(),
        }
    }

    #[tokio::test]
    async fn attachments_then_message_then_confirm() {
        let platform = Arc::new(
            FakePlatform::new()
                .with_transmissions("cfgB", vec![transmission("T1", Some("M1"))])
                .with_download("fake://T1", "c1;c2")
                .with_attachments("M1", vec![attachment("fake://a1")])
                .with_attachment_download("fake://a1", payload("drawing.pdf")),
        );
        let (engine, stored) = engine_with(&platform, Recorder::new(true));
        let report = engine.run_once().await;

        assert_eq!(report.received_attachments, 1);
        assert_eq!(report.received_messages, 1);
        assert_eq!(kinds(&stored), vec!["attachment:drawing.pdf", "message:T1"]);
        assert_eq!(
            platform.calls(),
            vec![
                PlatformCall::ListTransmissions("cfgB".to_string()),
                PlatformCall::ListMessageAttachments("M1".to_string()),
                PlatformCall::DownloadAttachment("fake://a1".to_string()),
                PlatformCall::DownloadTransmission("T1".to_string()),
                PlatformCall::ConfirmTransmission("T1".to_string()),
            ]
        );

        let guard = stored.lock().unwrap_or_else(PoisonError::into_inner);
        let attachment_id = guard[0].1.id();
        assert_eq!(attachment_id.len(), 32);
        assert_eq!(guard[1].1.content(), b"c1;c2");
    }

    #[tokio::test]
    async fn attachment_lookup_needs_tid_and_capability() {
        let platform = Arc::new(
            FakePlatform::new()
                .with_transmissions("cfgB", vec![transmission("T1", None)])
                .with_download("fake://T1", "body"),
        );
        let (engine, _) = engine_with(&platform, Recorder::new(true));
        engine.run_once().await;
        assert_eq!(platform.count("list_message_attachments"), 0);
        assert_eq!(platform.count("confirm_transmission"), 1);

        let platform = Arc::new(
            FakePlatform::new()
                .with_transmissions("cfgB", vec![transmission("T1", Some("M1"))])
                .with_download("fake://T1", "body"),
        );
        let (engine, _) = engine_with(&platform, Recorder::new(false));
        engine.run_once().await;
        assert_eq!(platform.count("list_message_attachments"), 0);
        assert_eq!(platform.count("confirm_transmission"), 1);
    }

    #[tokio::test]
    async fn download_failure_skips_to_the_next_transmission() {
        let platform = Arc::new(
            FakePlatform::new()
                .with_transmissions(
                    "cfgB",
                    vec![transmission("T1", None), transmission("T2", None)],
                )
                .with_download("fake://T2", "second"),
        );
        let (engine, stored) = engine_with(&platform, Recorder::new(false));
        let report = engine.run_once().await;

        assert_eq!(report.failures, 1);
        assert_eq!(report.received_messages, 1);
        assert_eq!(kinds(&stored), vec!["message:T2"]);
        assert_eq!(
            platform.calls().last(),
            Some(&PlatformCall::ConfirmTransmission("T2".to_string()))
        );
    }

    #[tokio::test]
    async fn attachment_without_filename_aborts_the_batch() {
        let platform = Arc::new(
            FakePlatform::new()
                .with_transmissions(
                    "cfgB",
                    vec![transmission("T1", Some("M1")), transmission("T2", None)],
                )
                .with_download("fake://T1", "c1")
                .with_download("fake://T2", "c2")
                .with_attachments("M1", vec![attachment("fake://a1")])
                .with_attachment_download("fake://a1", payload("")),
        );
        let (engine, stored) = engine_with(&platform, Recorder::new(true));
        let report = engine.run_once().await;

        assert_eq!(report.failures, 1);
        assert!(kinds(&stored).is_empty());
        assert_eq!(platform.count("download_transmission"), 0);
        assert_eq!(platform.count("confirm_transmission"), 0);
    }

    #[tokio::test]
    async fn rejected_attachment_urls_are_not_downloaded() {
        let platform = Arc::new(
            FakePlatform::new()
                .with_transmissions("cfgB", vec![transmission("T1", Some("M1"))])
                .with_download("fake://T1", "c1")
                .with_attachments("M1", vec![attachment("https://elsewhere/a1")]),
        );
        let mut recorder = Recorder::new(true);
        recorder.whitelist = Some("fake://");
        let (engine, _) = engine_with(&platform, recorder);
        let report = engine.run_once().await;

        assert_eq!(report.failures, 1);
        assert_eq!(platform.count("download_attachment"), 0);
        assert_eq!(platform.count("confirm_transmission"), 0);
    }

    #[tokio::test]
    async fn confirm_failure_aborts_the_batch() {
        let platform = Arc::new(
            FakePlatform::new()
                .with_transmissions(
                    "cfgB",
                    vec![transmission("T1", None), transmission("T2", None)],
                )
                .with_download("fake://T1", "c1")
                .with_download("fake://T2", "c2")
                .fail("confirm_transmission", 502),
        );
        let (engine, stored) = engine_with(&platform, Recorder::new(false));
        let report = engine.run_once().await;

        assert_eq!(report.failures, 1);
        assert_eq!(report.received_messages, 0);
        assert_eq!(kinds(&stored), vec!["message:T1"]);
        assert_eq!(platform.count("download_transmission"), 1);
    }
}
