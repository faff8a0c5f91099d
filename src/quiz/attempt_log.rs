use reqwest::header::CONTENT_TYPE;
use tokio::task::JoinHandle;

#[derive(Debug, serde::Serialize)]
struct AttemptPayload<'a> {
    question_id: &'a str,
    correct: bool,
}

/// Reports answered questions to the attempt sink. Fire and forget.
#[derive(Clone)]
pub struct AttemptLogger {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl AttemptLogger {
    pub fn new(client: reqwest::Client, endpoint: Option<String>) -> Self {
        Self { client, endpoint }
    }

    /// Spawns the POST and returns immediately. Failures are only logged.
    pub fn log(&self, question_id: Option<&str>, correct: bool) -> Option<JoinHandle<()>> {
        let endpoint = self.endpoint.clone()?;
        let payload = AttemptPayload {
            question_id: question_id.unwrap_or("unknown"),
            correct,
        };
        let body = match serde_json::to_string(&payload) {
            Ok(body) => body,
            Err(err) => {
                log::debug!("Could not encode quiz attempt: {}", err);
                return None;
            }
        };

        let client = self.client.clone();
        Some(tokio::spawn(async move {
            // the sink only accepts text/plain bodies
            let sent = client
                .post(&endpoint)
                .header(CONTENT_TYPE, "text/plain;charset=utf-8")
                .body(body)
                .send()
                .await;
            if let Err(err) = sent {
                log::debug!("Quiz attempt log dropped: {}", err);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_shape() {
        let payload = AttemptPayload {
            question_id: "sip-goal",
            correct: true,
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"question_id":"sip-goal","correct":true}"#
        );
    }

    #[tokio::test]
    async fn no_sink_means_no_request() {
        let logger = AttemptLogger::new(reqwest::Client::new(), None);
        assert!(logger.log(Some("q1"), true).is_none());
    }

    #[tokio::test]
    async fn unreachable_sink_is_swallowed() {
        let logger = AttemptLogger::new(
            reqwest::Client::new(),
            Some("http://127.0.0.1:9/attempts".to_string()),
        );
        let handle = logger.log(None, false).unwrap();
        assert!(handle.await.is_ok());
    }
}
