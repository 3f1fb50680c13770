use biometrics::{Collector, Counter};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("docent.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("docent.client.request_errors");

pub(crate) static STREAM_FRAGMENTS: Counter = Counter::new("docent.stream.fragments");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("docent.stream.errors");

pub(crate) static SESSION_SUBMITS: Counter = Counter::new("docent.session.submits");
pub(crate) static SESSION_CLEARS: Counter = Counter::new("docent.session.clears");
pub(crate) static STALE_RESULTS_DISCARDED: Counter =
    Counter::new("docent.session.stale_results_discarded");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);

    collector.register_counter(&STREAM_FRAGMENTS);
    collector.register_counter(&STREAM_ERRORS);

    collector.register_counter(&SESSION_SUBMITS);
    collector.register_counter(&SESSION_CLEARS);
    collector.register_counter(&STALE_RESULTS_DISCARDED);
}
