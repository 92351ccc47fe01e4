// SPDX-License-Identifier: Apache-2.0 OR MIT
#![cfg_attr(not(feature = "telemetry"), allow(dead_code))]

#[cfg(feature = "telemetry")]
mod otel {
    use std::path::Path;
    use std::sync::OnceLock;
    use std::time::Duration;

    use opentelemetry::global;
    use opentelemetry::metrics::{Counter, Histogram};
    use opentelemetry::trace::{Span, SpanKind, Tracer};
    use opentelemetry::KeyValue;

    const METER_NAME: &str = "lithos_tmpl";
    const TRACER_NAME: &str = "lithos_tmpl";

    static HANDLES: OnceLock<Handles> = OnceLock::new();

    struct Handles {
        tracer: global::BoxedTracer,
        file_hist: Histogram<f64>,
        file_counter: Counter<u64>,
    }

    impl Handles {
        fn new() -> Self {
            let meter = global::meter(METER_NAME);
            let file_hist = meter
                .f64_histogram("lithos.tmpl.file.duration_ms")
                .with_description("Time to render and write one template file in milliseconds")
                .init();
            let file_counter = meter
                .u64_counter("lithos.tmpl.file.count")
                .with_description("Number of template files processed")
                .init();
            Self {
                tracer: global::tracer(TRACER_NAME),
                file_hist,
                file_counter,
            }
        }
    }

    fn handles() -> &'static Handles {
        HANDLES.get_or_init(Handles::new)
    }

    pub fn record_file(template: &Path, duration: Duration, success: bool) {
        let hs = handles();
        let duration_ms = duration.as_secs_f64() * 1_000.0;
        let name = template.display().to_string();
        let attrs = [
            KeyValue::new("template.path", name.clone()),
            KeyValue::new("file.success", success),
        ];
        hs.file_counter.add(1, &attrs);
        hs.file_hist.record(duration_ms, &attrs);
        let mut span = hs
            .tracer
            .span_builder("Runner::process")
            .with_kind(SpanKind::Internal)
            .start(&hs.tracer);
        span.set_attribute(KeyValue::new("template.path", name));
        span.set_attribute(KeyValue::new("file.duration_ms", duration_ms));
        span.set_attribute(KeyValue::new("file.success", success));
        span.end();
    }
}

#[cfg(not(feature = "telemetry"))]
mod otel {
    use std::path::Path;
    use std::time::Duration;

    pub fn record_file(_template: &Path, _duration: Duration, _success: bool) {}
}

/// Records one processed template file. A no-op unless the `telemetry`
/// feature is enabled and a global OpenTelemetry provider is installed.
pub use otel::record_file;
