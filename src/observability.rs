use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("gptchat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("gptchat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("gptchat.client.request_duration_seconds");

pub(crate) static SESSION_TURNS: Counter = Counter::new("gptchat.session.turns");
pub(crate) static SESSION_TURN_ERRORS: Counter = Counter::new("gptchat.session.turn_errors");

pub(crate) static RENDER_CHARS: Counter = Counter::new("gptchat.render.chars");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&SESSION_TURNS);
    collector.register_counter(&SESSION_TURN_ERRORS);

    collector.register_counter(&RENDER_CHARS);
}
