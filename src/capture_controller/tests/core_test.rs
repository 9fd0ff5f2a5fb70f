#[cfg(test)]
mod core_test {
    use crate::capture_controller::core::{
        init, transition, ClassifierStatus, Effect, Model, ModelCapture, Msg, INIT_FAILED_MESSAGE,
    };
    use crate::device_capture::captured_image::CapturedImage;
    use crate::device_capture::interface::{
        CaptureError, CapturePayload, CaptureSource, CaptureStatus,
    };
    use crate::image_classifier::classifier::{ClassificationError, ClassifierInitError};
    use crate::image_classifier::interface::{EngineError, Label};
    use crate::image_classifier::result::ClassificationResult;
    use crate::permission_gate::gate::PermissionCheck;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    fn image() -> Arc<CapturedImage> {
        Arc::new(CapturedImage {
            width: 1,
            height: 1,
            rgba: vec![10, 20, 30, 255],
            source_path: None,
        })
    }

    fn ready_model() -> Model {
        Model {
            classifier: ClassifierStatus::Ready,
            text: "Latency: 12ms\nNo Result".to_string(),
            ..Model::default()
        }
    }

    fn capturing(model: Model, source: CaptureSource) -> Model {
        transition(model, Msg::CaptureRequested(source)).0
    }

    fn barrel_result() -> ClassificationResult {
        ClassificationResult::new(
            vec![Label::new("barrel", 0.93)],
            Duration::from_millis(120),
            0.6,
            3,
        )
    }

    #[test]
    fn test_init() {
        let (model, effects) = init();

        assert_eq!(model, Model::default());
        assert_eq!(model.classifier, ClassifierStatus::Loading);
        assert_eq!(
            effects,
            vec![Effect::EnsurePermissions, Effect::InitializeClassifier]
        );
    }

    #[test]
    fn test_classifier_ready() {
        let (model, effects) = transition(Model::default(), Msg::ClassifierInitDone(Ok(())));

        assert_eq!(model.classifier, ClassifierStatus::Ready);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_classifier_init_failure_is_shown() {
        let (model, effects) = transition(
            Model::default(),
            Msg::ClassifierInitDone(Err(ClassifierInitError::Configure(EngineError::Rejected(
                "bad".to_string(),
            )))),
        );

        assert_eq!(model.classifier, ClassifierStatus::Unavailable);
        assert_eq!(model.text, INIT_FAILED_MESSAGE);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_permission_answers_do_not_gate_capture() {
        let denied: HashMap<String, bool> = [("CAMERA".to_string(), false)].into_iter().collect();

        let (model, effects) = transition(ready_model(), Msg::PermissionsResult(denied));
        assert_eq!(model, ready_model());
        assert!(effects.is_empty());

        let (model, effects) = transition(
            model,
            Msg::PermissionsChecked(PermissionCheck::Requested(vec!["CAMERA".to_string()])),
        );
        let (_, effects_after) = transition(model, Msg::CaptureRequested(CaptureSource::Camera));

        assert!(effects.is_empty());
        assert_eq!(
            effects_after,
            vec![Effect::LaunchCapture {
                request_id: 1,
                source: CaptureSource::Camera
            }]
        );
    }

    #[test]
    fn test_capture_request_ids_increase() {
        let (model, effects) = transition(ready_model(), Msg::CaptureRequested(CaptureSource::Camera));
        assert_eq!(
            model.capture,
            ModelCapture::Capturing {
                request_id: 1,
                source: CaptureSource::Camera
            }
        );
        assert_eq!(
            effects,
            vec![Effect::LaunchCapture {
                request_id: 1,
                source: CaptureSource::Camera
            }]
        );

        let (model, effects) = transition(model, Msg::CaptureRequested(CaptureSource::Gallery));
        assert_eq!(model.last_request_id, 2);
        assert_eq!(
            effects,
            vec![Effect::LaunchCapture {
                request_id: 2,
                source: CaptureSource::Gallery
            }]
        );
    }

    #[test]
    fn test_cancelled_capture_changes_nothing_on_screen() {
        let before = capturing(ready_model(), CaptureSource::Camera);

        let (model, effects) = transition(
            before.clone(),
            Msg::CaptureResult {
                request_id: 1,
                status: CaptureStatus::Cancelled,
                payload: None,
            },
        );

        assert!(effects.is_empty());
        assert_eq!(model.capture, ModelCapture::Idle);
        assert_eq!(model.text, before.text);
        assert_eq!(model.preview, None);
    }

    #[test]
    fn test_successful_capture_decodes() {
        let payload = CapturePayload::File(PathBuf::from("/cache/JPEG_20240101_120000_1.jpg"));
        let model = capturing(ready_model(), CaptureSource::Camera);

        let (model, effects) = transition(
            model,
            Msg::CaptureResult {
                request_id: 1,
                status: CaptureStatus::Ok,
                payload: Some(payload.clone()),
            },
        );

        assert_eq!(model.capture, ModelCapture::Decoding { request_id: 1 });
        assert_eq!(
            effects,
            vec![Effect::DecodeImage {
                request_id: 1,
                payload
            }]
        );
    }

    #[test]
    fn test_ok_without_payload_is_ignored() {
        let model = capturing(ready_model(), CaptureSource::Gallery);

        let (model, effects) = transition(
            model,
            Msg::CaptureResult {
                request_id: 1,
                status: CaptureStatus::Ok,
                payload: None,
            },
        );

        assert_eq!(model.capture, ModelCapture::Idle);
        assert_eq!(model.text, ready_model().text);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_decoded_image_is_previewed_and_classified() {
        let model = capturing(ready_model(), CaptureSource::Gallery);
        let (model, _) = transition(
            model,
            Msg::CaptureResult {
                request_id: 1,
                status: CaptureStatus::Ok,
                payload: Some(CapturePayload::Content(vec![1, 2, 3])),
            },
        );
        let image = image();

        let (model, effects) = transition(
            model,
            Msg::DecodeDone {
                request_id: 1,
                result: Ok(image.clone()),
            },
        );

        assert_eq!(model.preview, Some(image.clone()));
        assert_eq!(model.capture, ModelCapture::Classifying { request_id: 1 });
        assert_eq!(
            effects,
            vec![Effect::Classify {
                request_id: 1,
                image
            }]
        );
    }

    #[test]
    fn test_corrupt_image_shows_error_and_skips_classification() {
        let model = capturing(ready_model(), CaptureSource::Gallery);
        let (model, _) = transition(
            model,
            Msg::CaptureResult {
                request_id: 1,
                status: CaptureStatus::Ok,
                payload: Some(CapturePayload::Content(vec![0xff, 0xd8])),
            },
        );
        let error = CaptureError::Decode("unexpected end of file".to_string());

        let (model, effects) = transition(
            model,
            Msg::DecodeDone {
                request_id: 1,
                result: Err(error.clone()),
            },
        );

        assert!(effects.is_empty());
        assert_eq!(model.text, error.to_string());
        assert_eq!(model.preview, None);
        assert_eq!(model.capture, ModelCapture::Idle);
    }

    #[test]
    fn test_capture_failure_is_shown() {
        let model = capturing(ready_model(), CaptureSource::Camera);
        let error = CaptureError::TempFile("read-only file system".to_string());

        let (model, effects) = transition(
            model,
            Msg::CaptureFailed {
                request_id: 1,
                error: error.clone(),
            },
        );

        assert!(effects.is_empty());
        assert_eq!(model.text, error.to_string());
    }

    #[test]
    fn test_classification_result_is_shown() {
        let model = Model {
            capture: ModelCapture::Classifying { request_id: 3 },
            last_request_id: 3,
            ..ready_model()
        };

        let (model, effects) = transition(
            model,
            Msg::ClassifyDone {
                request_id: 3,
                result: Ok(barrel_result()),
            },
        );

        assert!(effects.is_empty());
        assert_eq!(model.capture, ModelCapture::Idle);
        assert_eq!(
            model.text,
            "Latency: 120ms\nLabel: barrel, Confidence: 0.93"
        );
    }

    #[test]
    fn test_classification_error_is_shown() {
        let model = Model {
            capture: ModelCapture::Classifying { request_id: 1 },
            last_request_id: 1,
            ..ready_model()
        };

        let (model, _) = transition(
            model,
            Msg::ClassifyDone {
                request_id: 1,
                result: Err(ClassificationError::Uninitialized),
            },
        );

        assert_eq!(model.text, "Uninitialized Classifier.");
    }

    #[test]
    fn test_stale_classification_is_dropped() {
        let model = Model {
            capture: ModelCapture::Classifying { request_id: 1 },
            last_request_id: 1,
            ..ready_model()
        };
        let model = capturing(model, CaptureSource::Gallery);

        let (after, effects) = transition(
            model.clone(),
            Msg::ClassifyDone {
                request_id: 1,
                result: Ok(barrel_result()),
            },
        );

        assert!(effects.is_empty());
        assert_eq!(after, model);
    }

    #[test]
    fn test_stale_capture_result_is_dropped() {
        let model = capturing(ready_model(), CaptureSource::Camera);
        let model = capturing(model, CaptureSource::Gallery);

        let (after, effects) = transition(
            model.clone(),
            Msg::CaptureResult {
                request_id: 1,
                status: CaptureStatus::Ok,
                payload: Some(CapturePayload::File(PathBuf::from("/cache/old.jpg"))),
            },
        );

        assert!(effects.is_empty());
        assert_eq!(after, model);
    }

    #[test]
    fn test_teardown_shuts_classifier_down() {
        let model = capturing(ready_model(), CaptureSource::Camera);

        let (model, effects) = transition(model, Msg::Teardown);

        assert!(model.torn_down);
        assert_eq!(effects, vec![Effect::ShutdownClassifier]);
    }

    #[test]
    fn test_messages_after_teardown_are_ignored() {
        let (model, _) = transition(ready_model(), Msg::Teardown);

        let (after, effects) = transition(model.clone(), Msg::CaptureRequested(CaptureSource::Gallery));

        assert!(effects.is_empty());
        assert_eq!(after, model);
    }
}
