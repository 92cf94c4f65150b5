//! End-to-end tests for extract-and-generate
//!
//! Articles are served by wiremock; the LLM is either a counting fake or
//! the real HTTP client pointed at a second mock server.

use async_trait::async_trait;
use quizify_client::llm::{ChatCompletion, ChatRequest, GenerationError, LlmConfig, OpenAiChatClient, QuizGenerator};
use quizify_client::pipeline::{INVALID_URL_MESSAGE, PipelineError, QuizFormState, QuizPipeline};
use quizify_client::{ContentExtractor, FetchClient, FetchConfig, LectitoExtractor};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUIZ_JSON: &str = r#"{
    "title": "Quiz based on: Spring Tides",
    "questions": [
        {
            "id": "q1",
            "questionText": "When do spring tides happen?",
            "options": [
                {"id": "q1-opt1", "text": "At new and full moon"},
                {"id": "q1-opt2", "text": "Only in spring"},
                {"id": "q1-opt3", "text": "During storms"},
                {"id": "q1-opt4", "text": "Never"}
            ],
            "correctOptionId": "q1-opt1"
        }
    ]
}"#;

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Ocean Blog</title>
    <link>https://ocean.example/</link>
    <description>Posts</description>
    <item>
      <title>Spring Tides</title>
      <link>https://ocean.example/spring</link>
      <description>Spring tides happen at new and full moon.</description>
    </item>
  </channel>
</rss>"#;

/// Counts calls and replies with a fixed message.
struct CountingChat {
    calls: AtomicUsize,
    reply: Option<&'static str>,
}

impl CountingChat {
    fn new(reply: Option<&'static str>) -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), reply })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatCompletion for CountingChat {
    async fn complete(&self, _req: &ChatRequest) -> Result<Option<String>, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.map(str::to_string))
    }
}

fn pipeline(chat: Arc<dyn ChatCompletion>) -> QuizPipeline {
    let fetch = FetchClient::new(FetchConfig { timeout: Duration::from_secs(5), ..FetchConfig::default() }).unwrap();
    let extractor = ContentExtractor::new(fetch, Box::new(LectitoExtractor::new()));
    QuizPipeline::new(extractor, QuizGenerator::new(chat, "test-model", 1500, 0.2))
}

async fn serve_feed(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
        .mount(mock_server)
        .await;
}

/// Scenario A: article extracted and quiz generated
#[tokio::test]
async fn test_generates_quiz_from_article() {
    let mock_server = MockServer::start().await;
    serve_feed(&mock_server).await;
    let chat = CountingChat::new(Some(QUIZ_JSON));

    let quiz = pipeline(chat.clone()).run(&format!("{}/feed.xml", mock_server.uri())).await.unwrap();

    assert_eq!(quiz.title, "Spring Tides");
    assert_eq!(quiz.content, "Spring tides happen at new and full moon.");
    assert_eq!(quiz.quiz_data.questions.len(), 1);
    assert_eq!(chat.calls(), 1);

    let state = QuizFormState::from(Ok(quiz));
    let json = serde_json::to_value(&state).unwrap();
    assert!(json["error"].is_null());
    assert_eq!(json["quizData"]["questions"][0]["correctOptionId"], "q1-opt1");
}

fn five_question_quiz() -> String {
    let questions: Vec<String> = (1..=5)
        .map(|n| {
            format!(
                r#"{{"id": "q{n}", "questionText": "Question {n}?", "options": [
                    {{"id": "q{n}-opt1", "text": "Fox"}}, {{"id": "q{n}-opt2", "text": "Dog"}},
                    {{"id": "q{n}-opt3", "text": "Cat"}}, {{"id": "q{n}-opt4", "text": "Owl"}}
                ], "correctOptionId": "q{n}-opt1"}}"#
            )
        })
        .collect();
    format!(r#"{{"title": "Quiz based on: Fox", "questions": [{}]}}"#, questions.join(","))
}

#[tokio::test]
async fn test_feed_entry_text_reaches_generator_verbatim() {
    let mock_server = MockServer::start().await;
    let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Fox News</title>
    <link>https://fox.example/</link>
    <description>Posts</description>
    <item>
      <title>Fox</title>
      <link>https://fox.example/fox</link>
      <content:encoded><![CDATA[<p>The quick brown fox...</p>]]></content:encoded>
    </item>
  </channel>
</rss>"#;
    Mock::given(method("GET"))
        .and(path("/fox.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed))
        .mount(&mock_server)
        .await;

    let reply: &'static str = Box::leak(five_question_quiz().into_boxed_str());
    let chat = CountingChat::new(Some(reply));

    let quiz = pipeline(chat.clone()).run(&format!("{}/fox.xml", mock_server.uri())).await.unwrap();

    assert_eq!(quiz.content, "The quick brown fox...");
    assert_eq!(quiz.quiz_data.questions.len(), 5);
    assert!(quiz.quiz_data.questions.iter().all(|q| q.options.len() == 4));
}

/// Scenario B: invalid URL fails before any I/O
#[tokio::test]
async fn test_invalid_url_makes_no_calls() {
    let chat = CountingChat::new(Some(QUIZ_JSON));
    let pipeline = pipeline(chat.clone());

    for input in ["not a url", "", "ftp://example.com/file", "/relative/path"] {
        let err = pipeline.run(input).await.unwrap_err();
        assert!(matches!(err, PipelineError::Validation { .. }), "{input}");
        assert_eq!(err.to_string(), INVALID_URL_MESSAGE);
    }
    assert_eq!(chat.calls(), 0);
}

/// Scenario C: extraction failure never reaches the LLM
#[tokio::test]
async fn test_extraction_failure_skips_generation() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&mock_server)
        .await;
    let chat = CountingChat::new(Some(QUIZ_JSON));

    let err = pipeline(chat.clone()).run(&format!("{}/gone", mock_server.uri())).await.unwrap_err();

    match &err {
        PipelineError::Extraction(message) => assert!(message.starts_with("Failed to extract content")),
        other => panic!("expected extraction error, got {other:?}"),
    }
    assert_eq!(chat.calls(), 0);

    let state = QuizFormState::from(Err(err));
    assert!(state.title.is_none() && state.content.is_none() && state.quiz_data.is_none());
}

/// Scenario D: generation failure keeps the extracted article
#[tokio::test]
async fn test_generation_failure_keeps_content() {
    let mock_server = MockServer::start().await;
    serve_feed(&mock_server).await;
    let chat = CountingChat::new(Some("I cannot make a quiz from this."));

    let err = pipeline(chat.clone()).run(&format!("{}/feed.xml", mock_server.uri())).await.unwrap_err();

    assert!(err.to_string().starts_with("Quiz generation failed: malformed JSON"));
    let state = QuizFormState::from(Err(err));
    assert_eq!(state.title.as_deref(), Some("Spring Tides"));
    assert_eq!(state.content.as_deref(), Some("Spring tides happen at new and full moon."));
    assert!(state.quiz_data.is_none());
    assert_eq!(chat.calls(), 1);
}

fn llm_config(base_url: String) -> LlmConfig {
    LlmConfig {
        api_key: "sk-test".into(),
        base_url,
        model: "openai/gpt-3.5-turbo".into(),
        max_tokens: 1500,
        temperature: 0.2,
        timeout: Duration::from_secs(5),
    }
}

/// The HTTP client posts the expected request and reads the first choice
#[tokio::test]
async fn test_openai_client_round_trip() {
    let llm_server = MockServer::start().await;
    let completion = serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": QUIZ_JSON}}]
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "openai/gpt-3.5-turbo",
            "response_format": {"type": "json_object"},
            "max_tokens": 1500
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion))
        .expect(1)
        .mount(&llm_server)
        .await;

    let generator = QuizGenerator::from_config(llm_config(llm_server.uri())).unwrap();
    let quiz = generator.generate_quiz("Spring tides happen at new and full moon.", Some("Spring Tides")).await.unwrap();

    assert_eq!(quiz.title, "Quiz based on: Spring Tides");
}

/// Provider status codes map onto generation errors
#[tokio::test]
async fn test_openai_client_status_errors() {
    for (status, expected) in [(401u16, "authentication failed"), (429, "rate limited"), (502, "HTTP error: 502")] {
        let llm_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&llm_server)
            .await;

        let client = OpenAiChatClient::new(llm_config(llm_server.uri())).unwrap();
        let req = ChatRequest {
            model: "m".into(),
            messages: vec![],
            response_format: None,
            temperature: None,
            max_tokens: None,
        };
        let err = client.complete(&req).await.unwrap_err();
        assert!(err.to_string().contains(expected), "status {status} gave {err:?}");
    }
}

/// A reply without choices is an empty response
#[tokio::test]
async fn test_openai_client_empty_choices() {
    let llm_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&llm_server)
        .await;

    let generator = QuizGenerator::from_config(llm_config(llm_server.uri())).unwrap();
    let err = generator.generate_quiz("text", None).await.unwrap_err();
    assert!(matches!(err, GenerationError::EmptyResponse));
}
