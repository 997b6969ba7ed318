// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sm_core::test_support;

#[test]
fn request_tags_are_snake_case() {
    let json = serde_json::to_value(&Request::LoadJob {
        job_id: JobId::new(42),
    })
    .unwrap();
    assert_eq!(json["op"], "load_job");
    assert_eq!(json["job_id"], 42);
}

#[test]
fn response_round_trips_through_encode_decode() {
    let response = Response::Jobs {
        jobs: vec![test_support::running_job(1, "n1")],
    };
    let bytes = encode(&response).unwrap();
    let back: Response = decode(&bytes).unwrap();
    match back {
        Response::Jobs { jobs } => assert_eq!(jobs[0].job_id, JobId::new(1)),
        other => panic!("wrong shape: {other:?}"),
    }
}

#[test]
fn error_response_carries_code_and_message() {
    let response = Response::Error {
        code: ErrorCode::JobNotFound,
        message: "no job 7".into(),
    };
    let bytes = encode(&response).unwrap();
    let back: Response = decode(&bytes).unwrap();
    assert!(matches!(
        back,
        Response::Error {
            code: ErrorCode::JobNotFound,
            ..
        }
    ));
}

#[tokio::test]
async fn wire_round_trips_length_prefixed_messages() {
    let request = Request::CheckpointVacate {
        job_id: JobId::new(42),
        step_id: Some(StepId::new(0)),
        dir: PathBuf::from("/ckpt/42"),
    };
    let payload = encode(&request).unwrap();

    let mut buf = Vec::new();
    write_message(&mut buf, &payload).await.unwrap();
    assert_eq!(&buf[..4], &(payload.len() as u32).to_be_bytes());

    let mut cursor = std::io::Cursor::new(buf);
    let read = read_message(&mut cursor).await.unwrap();
    let back: Request = decode(&read).unwrap();
    assert!(matches!(
        back,
        Request::CheckpointVacate { job_id, .. } if job_id == JobId::new(42)
    ));
}

#[tokio::test]
async fn read_message_reports_closed_connection() {
    let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
    assert!(matches!(
        read_message(&mut cursor).await,
        Err(ProtocolError::ConnectionClosed)
    ));
}

#[tokio::test]
async fn oversized_length_prefix_is_rejected() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(u32::MAX).to_be_bytes());
    let mut cursor = std::io::Cursor::new(buf);
    assert!(matches!(
        read_message(&mut cursor).await,
        Err(ProtocolError::MessageTooLarge { .. })
    ));
}
