use englibot::chat::{AudioClip, Modality, Origin, Payload, Transcript};

#[test]
fn test_append_preserves_order() {
    let mut transcript = Transcript::new();
    assert!(transcript.is_empty());

    let first = transcript.append_text(Origin::User, "one");
    let second = transcript.append_text(Origin::Tutor, "two");

    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript.messages()[0], first);
    assert_eq!(transcript.messages()[1], second);
    assert_ne!(first.id, second.id);
    assert!(first.created_at <= second.created_at);
}

#[test]
fn test_last_tutor_text_skips_coach_and_audio() {
    let mut transcript = Transcript::new();
    assert_eq!(transcript.last_tutor_text(), None);

    transcript.append_text(Origin::Tutor, "Repeat: I am fine");
    transcript.append(
        Origin::User,
        Payload::Audio {
            clip: AudioClip {
                reference: "recordings/a.wav".to_string(),
                duration_secs: 1.5,
            },
        },
    );
    transcript.append_text(Origin::Coach, "Muy bien");

    assert_eq!(transcript.last_tutor_text(), Some("Repeat: I am fine"));
}

#[test]
fn test_text_message_json_shape() {
    let mut transcript = Transcript::new();
    let message = transcript.append_text(Origin::Tutor, "Hello!");

    let json = serde_json::to_value(&message).unwrap();
    assert_eq!(json["origin"], "tutor");
    assert_eq!(json["modality"], "text");
    assert_eq!(json["content"], "Hello!");
    assert!(json["id"].is_string());
    assert!(json["created_at"].is_string());
}

#[test]
fn test_audio_message_json_shape() {
    let mut transcript = Transcript::new();
    let message = transcript.append(
        Origin::User,
        Payload::Audio {
            clip: AudioClip {
                reference: "recordings/b.wav".to_string(),
                duration_secs: 2.0,
            },
        },
    );

    assert_eq!(message.modality(), Modality::Audio);
    assert_eq!(message.text(), None);

    let json = serde_json::to_value(&message).unwrap();
    assert_eq!(json["origin"], "user");
    assert_eq!(json["modality"], "audio");
    assert_eq!(json["clip"]["reference"], "recordings/b.wav");
    assert_eq!(json["clip"]["duration_secs"], 2.0);
}
