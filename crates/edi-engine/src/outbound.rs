//! Outbound processing: attachments, then messages, for one transport.

use edi_transport::{FinalizeError, Object, OutboundTransport};
use tracing::{error, info};

use crate::engine::{Engine, TickReport};
use crate::error::{EngineError, EngineResult};

impl Engine {
    pub(crate) async fn process_outbound(
        &self,
        config_id: &str,
        transport: &dyn OutboundTransport,
        report: &mut TickReport,
    ) {
        if let Err(err) = self
            .process_outbound_attachments(config_id, transport, report)
            .await
        {
            Self::record_failure("outbound_attachments", config_id, &err, report);
        }
        if let Err(err) = self
            .process_outbound_messages(config_id, transport, report)
            .await
        {
            Self::record_failure("outbound_messages", config_id, &err, report);
        }
    }

    async fn process_outbound_attachments(
        &self,
        config_id: &str,
        transport: &dyn OutboundTransport,
        report: &mut TickReport,
    ) -> EngineResult<()> {
        let Some(lister) = transport
            .attachment_lister()
            .filter(|lister| lister.handle_attachments())
        else {
            return Ok(());
        };
        let objects = self
            .guard
            .cancellable("list_attachments", config_id, lister.list_attachments())
            .await?;
        for object in objects {
            let uploaded = self
                .guard
                .cancellable(
                    "add_attachment",
                    object.id(),
                    self.platform
                        .add_attachment(object.content(), object.filename()),
                )
                .await;
            self.finalize_outbound(transport, &object, uploaded).await?;
            report.uploaded_attachments += 1;
            info!(config_id, path = object.id(), "attachment uploaded");
        }
        Ok(())
    }

    async fn process_outbound_messages(
        &self,
        config_id: &str,
        transport: &dyn OutboundTransport,
        report: &mut TickReport,
    ) -> EngineResult<()> {
        let objects = self
            .guard
            .cancellable("list_messages", config_id, transport.list_messages())
            .await?;
        for object in objects {
            let uploaded = self
                .guard
                .cancellable(
                    "add_transmission",
                    object.id(),
                    self.platform.add_transmission(config_id, object.content()),
                )
                .await;
            self.finalize_outbound(transport, &object, uploaded).await?;
            report.uploaded_messages += 1;
            info!(config_id, path = object.id(), "transmission uploaded");
        }
        Ok(())
    }

    /// Dispose of `object` according to `outcome` and pass the outcome on.
    /// Cancelled uploads are left in place for the next run.
    async fn finalize_outbound(
        &self,
        transport: &dyn OutboundTransport,
        object: &Object,
        outcome: EngineResult<()>,
    ) -> EngineResult<()> {
        let Some(finalizer) = transport.finalizer() else {
            return outcome;
        };
        match outcome {
            Ok(()) => {
                self.guard
                    .bounded("finalize", object.id(), finalizer.finalize(object, None))
                    .await
            }
            Err(err) if err.is_cancelled() => Err(err),
            Err(err) => {
                let cause: &FinalizeError = &err;
                if let Err(finalize_err) = self
                    .guard
                    .bounded("finalize", object.id(), finalizer.finalize(object, Some(cause)))
                    .await
                {
                    error!(
                        path = object.id(),
                        error = ?finalize_err,
                        "failed upload could not be finalized"
                    );
                }
                Err(err)
            }
        }
    }
}
