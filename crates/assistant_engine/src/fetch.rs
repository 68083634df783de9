use assistant_core::{aggregate, EntryBuckets, LabelFilter, SourceRecords};
use assistant_logging::{qra_debug, qra_warn, LogCategory};

use crate::sources::{read_native_sets, read_raw_element, read_script_buttons, read_tasks};
use crate::{Dom, EngineConfig, ProviderError, Providers};

fn isolate<T>(source: &str, result: Result<Vec<T>, ProviderError>) -> Vec<T> {
    result.unwrap_or_else(|err| {
        qra_warn!(LogCategory::Api; "{source} unavailable, treating as empty: {err}");
        Vec::new()
    })
}

/// Reads every source and merges them into the popup buckets.
///
/// A failing or absent source contributes nothing; the others are unaffected.
pub fn fetch_entries(
    providers: &Providers,
    dom: &Dom,
    config: &EngineConfig,
    filter: LabelFilter,
) -> EntryBuckets {
    let character = providers.current_character();

    let native = isolate(
        "native quick replies",
        providers
            .native
            .as_deref()
            .ok_or(ProviderError::Missing("native quick replies"))
            .and_then(|p| read_native_sets(p)),
    );
    let scripts = isolate(
        "script runner",
        providers
            .script_runner
            .as_deref()
            .ok_or(ProviderError::Missing("script runner"))
            .and_then(|p| read_script_buttons(p, character.as_ref())),
    );
    let tasks = isolate(
        "task plugin",
        providers
            .tasks
            .as_deref()
            .ok_or(ProviderError::Missing("task plugin"))
            .and_then(|p| read_tasks(p, character.as_ref())),
    );
    let raw = config
        .raw_element_id
        .as_deref()
        .and_then(|id| read_raw_element(dom, id));

    let records = SourceRecords {
        native,
        scripts,
        tasks,
        raw,
    };
    let buckets = aggregate(&records, filter);
    qra_debug!(
        LogCategory::Api;
        "fetched {} script entries and {} standard entries",
        buckets.scripts.len(),
        buckets.standard.len()
    );
    buckets
}
