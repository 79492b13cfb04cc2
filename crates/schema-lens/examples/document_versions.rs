//! Two generations of an app editing the same document.
//!
//! The old client knows `message`; the new one renamed it to `printout`
//! and added `author`. Both write to one ledger and each sees the other's
//! edits in its own vocabulary.

use schema_lens::prelude::*;
use serde_json::json;

fn main() -> Result<(), LensError> {
    let mut lineage = Lineage::new();
    let v1 = lineage.add_field(EMPTY_SCHEMA, "message")?;
    let v2 = lineage.rename_field(v1, "message", "printout")?;
    let v2 = lineage.add_field(v2, "author")?;

    let old_client = lineage.new_instance(v1, [("message", json!("draft"))])?;
    let new_client = lineage.view_instance(v2, &old_client)?;

    println!("new client sees: {:?}", new_client.read(&lineage)?);

    new_client.set("printout", json!("final"))?;
    new_client.set("author", json!("sam"))?;

    println!("old client sees: {:?}", old_client.read(&lineage)?);
    println!("new client sees: {:?}", new_client.read(&lineage)?);
    println!("ledger holds {} writes", new_client.ledger().len()?);

    Ok(())
}
