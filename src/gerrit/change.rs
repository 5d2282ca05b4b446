//! A single Gerrit change.

use serde_json::Value;
use tracing::debug;

use super::api::{Api, ApiResult, GsqlValue};
use crate::error::BartError;
use crate::Result;

const UPDATE_MERGED_SQL: &str =
    "UPDATE changes SET status = 'M', current_patch_set_id = ? WHERE change_key = ?";

const INSERT_PATCH_SET_SQL: &str = "INSERT INTO patch_sets \
     (revision, uploader_account_id, change_id, patch_set_id, created_on) \
     VALUES (?, ?, ?, ?, NOW())";

/// Labels a change needs before it may be submitted.
const REVIEWED_AND_VERIFIED: [&str; 4] = [
    "label:Code-Review+2",
    "label:Verified+1",
    "NOT label:Code-Review-2",
    "NOT label:Verified-1",
];

/// A Gerrit change identified by its Change-Id.
///
/// Remote data is fetched on first use and kept for the lifetime of the
/// value.
pub struct Change<'a> {
    change_id: String,
    api: &'a dyn Api,
    merger_account_id: i64,
    remote: Option<ApiResult>,
}

impl<'a> Change<'a> {
    /// Create a change backed by `api`. Nothing is fetched yet.
    pub fn new(change_id: impl Into<String>, api: &'a dyn Api) -> Self {
        Self {
            change_id: change_id.into(),
            api,
            merger_account_id: 1,
            remote: None,
        }
    }

    /// Account recorded as the uploader by [`mark_merged`](Self::mark_merged).
    pub fn with_merger_account(mut self, account_id: i64) -> Self {
        self.merger_account_id = account_id;
        self
    }

    /// The Change-Id.
    pub fn change_id(&self) -> &str {
        &self.change_id
    }

    fn load(&mut self) -> Result<&ApiResult> {
        let remote = match self.remote.take() {
            Some(remote) => remote,
            None => {
                debug!(change_id = %self.change_id, "Loading change data");
                self.api
                    .query("--current-patch-set %s", &[self.change_id.clone()])?
            }
        };
        Ok(self.remote.insert(remote))
    }

    fn record(&mut self) -> Result<&Value> {
        let change_id = self.change_id.clone();
        let remote = self.load()?;
        if remote.row_count == 0 {
            return Err(BartError::ChangeNotFound(change_id));
        }
        remote
            .first()
            .ok_or_else(|| BartError::GerritParse(format!("no record for change {change_id}")))
    }

    /// Whether Gerrit knows this change.
    pub fn exists(&mut self) -> Result<bool> {
        Ok(self.load()?.row_count > 0)
    }

    /// The numeric change number, as Gerrit reports it.
    pub fn number(&mut self) -> Result<String> {
        let record = self.record()?;
        field_string(record, "number")
            .ok_or_else(|| BartError::GerritParse("change record has no number".into()))
    }

    /// Number of the current patch set.
    pub fn current_patch_set_number(&mut self) -> Result<u32> {
        let record = self.record()?;
        record
            .get("currentPatchSet")
            .and_then(|ps| field_string(ps, "number"))
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| {
                BartError::GerritParse("change record has no current patch set number".into())
            })
    }

    /// Whether the change has Code-Review+2 and Verified+1 with no vetoes.
    pub fn is_reviewed_and_verified(&self) -> Result<bool> {
        let mut args = vec![self.change_id.clone()];
        args.extend(REVIEWED_AND_VERIFIED.iter().map(|s| s.to_string()));

        let result = self
            .api
            .query("--current-patch-set %s %s %s %s %s", &args)?;
        Ok(result.row_count == 1)
    }

    /// Record `commit_hash` as a new patch set and mark the change merged.
    ///
    /// Cached remote data is dropped afterwards.
    pub fn mark_merged(&mut self, commit_hash: &str) -> Result<()> {
        let next_patch_set = self.current_patch_set_number()? + 1;
        let number: i64 = self
            .number()?
            .parse()
            .map_err(|_| BartError::GerritParse("change number is not numeric".into()))?;

        debug!(change_id = %self.change_id, patch_set = next_patch_set, "Marking change merged");

        self.api.gsql(
            UPDATE_MERGED_SQL,
            &[next_patch_set.into(), self.change_id.as_str().into()],
        )?;
        self.api.gsql(
            INSERT_PATCH_SET_SQL,
            &[
                commit_hash.into(),
                GsqlValue::Int(self.merger_account_id),
                GsqlValue::Int(number),
                next_patch_set.into(),
            ],
        )?;

        self.remote = None;
        Ok(())
    }

    /// Abandon the change with a message.
    pub fn abandon(&mut self, message: &str) -> Result<()> {
        let target = self.review_target()?;
        self.api.review(&target, None, message, &["--abandon"])?;
        Ok(())
    }

    /// Leave a comment on the current patch set.
    pub fn comment(&mut self, message: &str) -> Result<()> {
        let target = self.review_target()?;
        self.api.review(&target, None, message, &[])?;
        Ok(())
    }

    /// `"<change number>,<patch set>"` as `gerrit review` expects.
    fn review_target(&mut self) -> Result<String> {
        let number = self.number()?;
        let patch_set = self.current_patch_set_number()?;
        Ok(format!("{number},{patch_set}"))
    }
}

/// Read a field that Gerrit emits either as a string or as a number.
fn field_string(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
