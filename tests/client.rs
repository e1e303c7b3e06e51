//! End-to-end tests for the telemetry client: entity normalization,
//! validation, envelope wrapping, and flush behavior.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use telebatch::{
    BoxError, Client, ClientError, Event, EventBody, Generation, IngestionEvent,
    IngestionEventType, Observation, ObservationType, Score, SdkLog, Sink, SinkRef, Span, Trace,
};

/// Records every delivered envelope batch.
#[derive(Default)]
struct EnvelopeSink {
    calls: Mutex<Vec<Vec<IngestionEvent>>>,
}

impl EnvelopeSink {
    fn arc() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every delivered envelope, flattened in completion order.
    fn envelopes(&self) -> Vec<IngestionEvent> {
        self.calls.lock().unwrap().clone().into_iter().flatten().collect()
    }
}

#[async_trait]
impl Sink<IngestionEvent> for EnvelopeSink {
    async fn deliver(
        &self,
        _ctx: CancellationToken,
        batch: Vec<IngestionEvent>,
    ) -> Result<(), BoxError> {
        self.calls.lock().unwrap().push(batch);
        Ok(())
    }
}

fn client(sink: Arc<EnvelopeSink>) -> Client {
    Client::new(CancellationToken::new(), sink as SinkRef<IngestionEvent>)
}

#[tokio::test(start_paused = true)]
async fn test_trace_fills_id_and_wraps() {
    let sink = EnvelopeSink::arc();
    let client = client(sink.clone());

    let trace = client.trace(Trace::default()).unwrap();
    let trace_id = trace.id.clone().unwrap();
    assert!(!trace_id.is_empty());

    client.flush().await;
    let envelopes = sink.envelopes();
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].event_type, IngestionEventType::TraceCreate);
    assert_ne!(envelopes[0].id, trace_id, "envelope id is distinct");
    match &envelopes[0].body {
        EventBody::Trace(t) => assert_eq!(t.id.as_deref(), Some(trace_id.as_str())),
        other => panic!("unexpected body: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_trace_keeps_caller_id() {
    let sink = EnvelopeSink::arc();
    let client = client(sink.clone());

    let trace = client
        .trace(Trace {
            id: Some("caller-chosen".into()),
            ..Trace::default()
        })
        .unwrap();
    assert_eq!(trace.id.as_deref(), Some("caller-chosen"));
    client.flush().await;
}

#[tokio::test(start_paused = true)]
async fn test_span_without_trace_creates_parent() {
    let sink = EnvelopeSink::arc();
    let client = client(sink.clone());

    let span = client
        .span(
            Span {
                name: Some("work".into()),
                ..Span::default()
            },
            None,
        )
        .unwrap();
    let trace_id = span.trace_id.clone().unwrap();
    assert_eq!(span.observation_type, Some(ObservationType::Span));

    client.flush().await;
    let envelopes = sink.envelopes();
    assert_eq!(envelopes.len(), 2, "implicit trace-create plus span-create");
    assert_eq!(envelopes[0].event_type, IngestionEventType::TraceCreate);
    match &envelopes[0].body {
        EventBody::Trace(t) => {
            assert_eq!(t.id.as_deref(), Some(trace_id.as_str()));
            assert_eq!(t.name.as_deref(), Some("work"));
        }
        other => panic!("unexpected body: {other:?}"),
    }
    assert_eq!(envelopes[1].event_type, IngestionEventType::SpanCreate);
}

#[tokio::test(start_paused = true)]
async fn test_span_with_parent_is_linked() {
    let sink = EnvelopeSink::arc();
    let client = client(sink.clone());

    let span = client
        .span(
            Span {
                trace_id: Some("t-1".into()),
                ..Span::default()
            },
            Some("parent-1"),
        )
        .unwrap();
    assert_eq!(span.parent_observation_id.as_deref(), Some("parent-1"));

    client.flush().await;
    assert_eq!(sink.envelopes().len(), 1, "no implicit trace when one is set");
}

#[tokio::test(start_paused = true)]
async fn test_span_end_validates() {
    let sink = EnvelopeSink::arc();
    let client = client(sink.clone());

    let missing_id = client.span_end(Span {
        trace_id: Some("t-1".into()),
        ..Span::default()
    });
    assert_eq!(missing_id.unwrap_err(), ClientError::MissingId { entity: "span" });

    let missing_trace = client.span_end(Span {
        id: Some("s-1".into()),
        ..Span::default()
    });
    assert_eq!(missing_trace.unwrap_err(), ClientError::MissingTraceId);

    let ok = client
        .span_end(Span {
            id: Some("s-1".into()),
            trace_id: Some("t-1".into()),
            ..Span::default()
        })
        .unwrap();
    assert_eq!(ok.observation_type, Some(ObservationType::Span));

    client.flush().await;
    let envelopes = sink.envelopes();
    assert_eq!(envelopes.len(), 1, "failed validation enqueues nothing");
    assert_eq!(envelopes[0].event_type, IngestionEventType::SpanUpdate);
}

#[tokio::test(start_paused = true)]
async fn test_generation_lifecycle() {
    let sink = EnvelopeSink::arc();
    let client = client(sink.clone());

    let generation = client
        .generation(
            Generation {
                name: Some("completion".into()),
                model: Some("gpt-x".into()),
                ..Generation::default()
            },
            None,
        )
        .unwrap();
    assert_eq!(
        generation.observation_type,
        Some(ObservationType::Generation)
    );

    client.generation_end(generation.clone()).unwrap();

    let missing = client.generation_end(Generation::default());
    assert_eq!(
        missing.unwrap_err(),
        ClientError::MissingId {
            entity: "generation"
        }
    );

    client.flush().await;
    let kinds: Vec<_> = sink.envelopes().iter().map(|e| e.event_type).collect();
    assert_eq!(
        kinds,
        vec![
            IngestionEventType::TraceCreate,
            IngestionEventType::GenerationCreate,
            IngestionEventType::GenerationUpdate,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_event_defaults_type() {
    let sink = EnvelopeSink::arc();
    let client = client(sink.clone());

    let event = client
        .event(
            Event {
                trace_id: Some("t-1".into()),
                ..Event::default()
            },
            None,
        )
        .unwrap();
    assert_eq!(event.observation_type, Some(ObservationType::Event));
    assert!(event.id.is_some());

    client.flush().await;
    assert_eq!(
        sink.envelopes()[0].event_type,
        IngestionEventType::EventCreate
    );
}

#[tokio::test(start_paused = true)]
async fn test_observation_update_validates() {
    let sink = EnvelopeSink::arc();
    let client = client(sink.clone());

    let missing = client.observation_update(Observation::default());
    assert_eq!(
        missing.unwrap_err(),
        ClientError::MissingId {
            entity: "observation"
        }
    );

    let ok = client
        .observation_update(Observation {
            id: Some("o-1".into()),
            trace_id: Some("t-1".into()),
            ..Observation::default()
        })
        .unwrap();
    assert_eq!(ok.observation_type, Some(ObservationType::Span));

    client.flush().await;
    assert_eq!(
        sink.envelopes()[0].event_type,
        IngestionEventType::ObservationUpdate
    );
}

#[tokio::test(start_paused = true)]
async fn test_score_requires_trace() {
    let sink = EnvelopeSink::arc();
    let client = client(sink.clone());

    let missing = client.score(Score::default());
    assert_eq!(missing.unwrap_err(), ClientError::MissingTraceId);

    let score = client
        .score(Score {
            trace_id: Some("t-1".into()),
            name: Some("accuracy".into()),
            ..Score::default()
        })
        .unwrap();
    assert!(score.id.is_some(), "missing score id is filled");

    client.flush().await;
    assert_eq!(
        sink.envelopes()[0].event_type,
        IngestionEventType::ScoreCreate
    );
}

#[tokio::test(start_paused = true)]
async fn test_sdk_log_is_wrapped() {
    let sink = EnvelopeSink::arc();
    let client = client(sink.clone());

    client
        .sdk_log(SdkLog {
            log: serde_json::json!({ "level": "info", "msg": "boot" }),
        })
        .unwrap();

    client.flush().await;
    let envelopes = sink.envelopes();
    assert_eq!(envelopes[0].event_type, IngestionEventType::SdkLog);
    match &envelopes[0].body {
        EventBody::SdkLog(l) => assert_eq!(l.log["msg"], "boot"),
        other => panic!("unexpected body: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_flush_interval_drives_background_delivery() {
    let sink = EnvelopeSink::arc();
    let client = Client::new(
        CancellationToken::new(),
        sink.clone() as SinkRef<IngestionEvent>,
    )
    .with_flush_interval(Duration::from_millis(25));
    assert_eq!(client.flush_interval(), Duration::from_millis(25));

    client.trace(Trace::default()).unwrap();
    sleep(Duration::from_millis(60)).await;

    assert_eq!(
        sink.envelopes().len(),
        1,
        "the background tick delivered without an explicit flush"
    );
}

#[tokio::test(start_paused = true)]
async fn test_batch_serializes_with_wire_names() {
    let sink = EnvelopeSink::arc();
    let client = client(sink.clone());

    client
        .trace(Trace {
            user_id: Some("u-1".into()),
            session_id: Some("s-1".into()),
            ..Trace::default()
        })
        .unwrap();
    client.flush().await;

    let value = serde_json::to_value(sink.envelopes()).unwrap();
    assert_eq!(value[0]["type"], "trace-create");
    assert_eq!(value[0]["body"]["userId"], "u-1");
    assert_eq!(value[0]["body"]["sessionId"], "s-1");
    assert!(value[0]["body"].get("release").is_none(), "unset fields omitted");
}
