//! Single-shot signature status checks.

use tracing::warn;

use crate::confirm::outcome::{render_error, StatusCheck};
use crate::diagnostics::Explorer;
use crate::observability::metrics;
use crate::rpc::client::SolanaRpc;
use crate::rpc::types::{Commitment, RpcResult, Signature};

/// Query the node once for `signature` against `commitment`.
///
/// Transport and node errors are returned to the caller.
pub async fn check_status(
    rpc: &dyn SolanaRpc,
    signature: &Signature,
    commitment: Commitment,
    search_history: bool,
) -> RpcResult<StatusCheck> {
    let Some(status) = rpc.get_signature_status(signature, search_history).await? else {
        return Ok(StatusCheck::NotFound);
    };

    if let Some(err) = &status.err {
        return Ok(StatusCheck::Failed(render_error(err)));
    }

    if status.satisfies(commitment) {
        Ok(StatusCheck::Success)
    } else {
        Ok(StatusCheck::NotFound)
    }
}

/// Like [`check_status`], but an RPC failure is logged with an explorer
/// link and reported as `NotFound`.
pub async fn check_status_with_fallback(
    rpc: &dyn SolanaRpc,
    explorer: &Explorer,
    signature: &Signature,
    commitment: Commitment,
    search_history: bool,
) -> StatusCheck {
    match check_status(rpc, signature, commitment, search_history).await {
        Ok(check) => {
            metrics::record_status_check(check.label());
            check
        }
        Err(e) => {
            warn!(
                signature = %signature,
                error = %e,
                explorer_url = %explorer.tx_url(signature),
                "Status check failed, treating as not found"
            );
            metrics::record_status_check("rpc_error");
            StatusCheck::NotFound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;
    use crate::rpc::mock::{status, transport_error, MockRpc};
    use serde_json::json;

    fn sig() -> Signature {
        Signature::from([9u8; 64])
    }

    #[tokio::test]
    async fn test_not_found_when_unknown() {
        let rpc = MockRpc::new().with_statuses(vec![Ok(None)]);
        let check = check_status(&rpc, &sig(), Commitment::Confirmed, true).await.unwrap();
        assert_eq!(check, StatusCheck::NotFound);
    }

    #[tokio::test]
    async fn test_commitment_threshold() {
        let rpc = MockRpc::new().with_statuses(vec![Ok(Some(status(Some(Commitment::Processed), None)))]);
        let check = check_status(&rpc, &sig(), Commitment::Confirmed, true).await.unwrap();
        assert_eq!(check, StatusCheck::NotFound);

        let rpc = MockRpc::new().with_statuses(vec![Ok(Some(status(Some(Commitment::Finalized), None)))]);
        let check = check_status(&rpc, &sig(), Commitment::Confirmed, true).await.unwrap();
        assert_eq!(check, StatusCheck::Success);
    }

    #[tokio::test]
    async fn test_recorded_error_wins_over_commitment() {
        let err = json!({"InstructionError": [0, "Custom"]});
        let rpc = MockRpc::new()
            .with_statuses(vec![Ok(Some(status(Some(Commitment::Processed), Some(err))))]);
        let check = check_status(&rpc, &sig(), Commitment::Finalized, true).await.unwrap();
        assert_eq!(check, StatusCheck::Failed(r#"{"InstructionError":[0,"Custom"]}"#.to_string()));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let rpc = MockRpc::new().with_statuses(vec![Err(transport_error())]);
        assert!(check_status(&rpc, &sig(), Commitment::Confirmed, true).await.is_err());

        let explorer = Explorer::new("https://explorer.solana.com", Network::Devnet);
        let check =
            check_status_with_fallback(&rpc, &explorer, &sig(), Commitment::Confirmed, true).await;
        assert_eq!(check, StatusCheck::NotFound);
    }
}
