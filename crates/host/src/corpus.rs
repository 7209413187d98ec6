//! Document corpus loading.
//!
//! The host indexes plain `.md`/`.txt` files from a configurable
//! directory, falling back to a built-in product documentation set when
//! no directory is given. Files are read in name order so the index is
//! deterministic across runs.

use std::path::Path;

use tracing::{info, warn};

use crabdesk_core::Result;
use crabdesk_core::knowledge::Document;

/// Load every `.md`/`.txt` file under `dir` as one document.
pub fn load_documents(dir: &Path) -> Result<Vec<Document>> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("md") | Some("txt")
            )
        })
        .collect();
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable document");
                continue;
            }
        };
        let source = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        let id = path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        documents.push(Document { id, source, text });
    }

    info!(dir = %dir.display(), documents = documents.len(), "corpus loaded");
    Ok(documents)
}

/// The built-in OmniTech product documentation set.
pub fn builtin_documents() -> Vec<Document> {
    fn doc(id: &str, text: &str) -> Document {
        Document {
            id: id.into(),
            source: format!("{id}.md"),
            text: text.into(),
        }
    }

    vec![
        doc(
            "account_security_guide",
            "OmniTech Account Security Guide. To reset a forgotten password, open \
             the OmniTech app, choose Account Settings, then Reset Password. A reset \
             link is emailed within five minutes; it expires after one hour. If your \
             account is locked after repeated failed sign-in attempts, wait fifteen \
             minutes before trying again. Two-factor authentication can be enabled \
             under Security Settings using an authenticator app. If you believe your \
             account was compromised, reset the password immediately and review the \
             active sessions list, signing out any device you do not recognize.",
        ),
        doc(
            "device_troubleshooting_guide",
            "OmniTech Device Troubleshooting Guide. If a device will not turn on, \
             hold the power button for ten seconds to force a restart, then charge \
             it with the supplied cable for at least thirty minutes. A frozen screen \
             usually clears after a forced restart. Rapid battery drain is most \
             often caused by outdated firmware; update from Settings, then System \
             Update. A factory reset erases all data: hold power and volume-down \
             together for fifteen seconds and follow the on-screen prompts. If a \
             device still fails after these steps it may need repair under warranty.",
        ),
        doc(
            "shipping_policy",
            "OmniTech Shipping Policy. Standard shipping takes five business days \
             inside the continental United States; expedited shipping takes two. A \
             tracking number is emailed as soon as the carrier picks up the package, \
             usually within one business day of the order. International delivery \
             takes seven to fourteen business days depending on the destination and \
             customs. If tracking has not updated for more than three business days, \
             contact support with the order number and we will open a trace with the \
             carrier.",
        ),
        doc(
            "returns_policy",
            "OmniTech Returns and Refunds Policy. Items may be returned within \
             thirty days of delivery for a full refund to the original payment \
             method; refunds post within five business days of the return arriving \
             at our warehouse. Devices must be returned in their original packaging \
             with all accessories. Defective devices are exchanged free of charge \
             under the one-year limited warranty. To start a return, request a \
             prepaid label from the orders page. Opened software and gift cards are \
             not refundable.",
        ),
        doc(
            "product_overview",
            "OmniTech Product Overview. OmniTech builds connected home devices: the \
             Hub X smart-home controller, the Sense line of environment sensors, \
             and the Beam indoor camera. All devices pair through the OmniTech app \
             and receive firmware updates for five years from release. The Hub X \
             supports Matter and works with third-party ecosystems. Subscriptions \
             are optional; local control and automation work without one.",
        ),
    ]
}
