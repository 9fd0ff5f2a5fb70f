use crate::device_capture::captured_image::CapturedImage;
use crate::device_capture::interface::{
    CaptureError, CapturePayload, CaptureSource, CaptureStatus, RequestId,
};
use crate::image_classifier::classifier::{ClassifierInitError, ClassifyOutcome};
use crate::permission_gate::gate::PermissionCheck;
use crate::permission_gate::interface::PermissionResults;
use std::sync::Arc;

pub const INIT_FAILED_MESSAGE: &str = "Failed to initialize the image classifier";

//
//
//

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ClassifierStatus {
    #[default]
    Loading,
    Ready,
    Unavailable,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ModelCapture {
    #[default]
    Idle,
    Capturing {
        request_id: RequestId,
        source: CaptureSource,
    },
    Decoding {
        request_id: RequestId,
    },
    Classifying {
        request_id: RequestId,
    },
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Model {
    pub classifier: ClassifierStatus,
    pub capture: ModelCapture,
    /// Id handed to the most recent capture; 0 before the first one.
    pub last_request_id: RequestId,
    pub preview: Option<Arc<CapturedImage>>,
    pub text: String,
    pub torn_down: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    PermissionsChecked(PermissionCheck),
    PermissionsResult(PermissionResults),
    ClassifierInitDone(Result<(), ClassifierInitError>),
    CaptureRequested(CaptureSource),
    CaptureResult {
        request_id: RequestId,
        status: CaptureStatus,
        payload: Option<CapturePayload>,
    },
    CaptureFailed {
        request_id: RequestId,
        error: CaptureError,
    },
    DecodeDone {
        request_id: RequestId,
        result: Result<Arc<CapturedImage>, CaptureError>,
    },
    ClassifyDone {
        request_id: RequestId,
        result: ClassifyOutcome,
    },
    Teardown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    EnsurePermissions,
    InitializeClassifier,
    LaunchCapture {
        request_id: RequestId,
        source: CaptureSource,
    },
    DecodeImage {
        request_id: RequestId,
        payload: CapturePayload,
    },
    Classify {
        request_id: RequestId,
        image: Arc<CapturedImage>,
    },
    ShutdownClassifier,
}

//
//
//

pub fn init() -> (Model, Vec<Effect>) {
    (
        Model::default(),
        vec![Effect::EnsurePermissions, Effect::InitializeClassifier],
    )
}

//
//
//

pub fn transition(model: Model, msg: Msg) -> (Model, Vec<Effect>) {
    if model.torn_down {
        return (model, vec![]);
    }

    match msg {
        // Permission answers are observed, never acted on.
        Msg::PermissionsChecked(_) | Msg::PermissionsResult(_) => (model, vec![]),

        Msg::ClassifierInitDone(Ok(())) => (
            Model {
                classifier: ClassifierStatus::Ready,
                ..model
            },
            vec![],
        ),

        Msg::ClassifierInitDone(Err(_)) => (
            Model {
                classifier: ClassifierStatus::Unavailable,
                text: INIT_FAILED_MESSAGE.to_string(),
                ..model
            },
            vec![],
        ),

        Msg::CaptureRequested(source) => {
            let request_id = model.last_request_id + 1;
            (
                Model {
                    capture: ModelCapture::Capturing { request_id, source },
                    last_request_id: request_id,
                    ..model
                },
                vec![Effect::LaunchCapture { request_id, source }],
            )
        }

        Msg::Teardown => (
            Model {
                capture: ModelCapture::Idle,
                torn_down: true,
                ..model
            },
            vec![Effect::ShutdownClassifier],
        ),

        msg => transition_capture(model, msg),
    }
}

fn transition_capture(model: Model, msg: Msg) -> (Model, Vec<Effect>) {
    match (model.capture.clone(), msg) {
        (
            ModelCapture::Capturing {
                request_id: active, ..
            },
            Msg::CaptureResult {
                request_id,
                status,
                payload,
            },
        ) if active == request_id => match (status, payload) {
            (CaptureStatus::Ok, Some(payload)) => (
                Model {
                    capture: ModelCapture::Decoding { request_id },
                    ..model
                },
                vec![Effect::DecodeImage {
                    request_id,
                    payload,
                }],
            ),
            // Cancelled, or nothing came back: keep whatever is on screen.
            _ => (
                Model {
                    capture: ModelCapture::Idle,
                    ..model
                },
                vec![],
            ),
        },

        (
            ModelCapture::Capturing {
                request_id: active, ..
            },
            Msg::CaptureFailed { request_id, error },
        ) if active == request_id => (
            Model {
                capture: ModelCapture::Idle,
                text: error.to_string(),
                ..model
            },
            vec![],
        ),

        (ModelCapture::Decoding { request_id: active }, Msg::DecodeDone { request_id, result })
            if active == request_id =>
        {
            match result {
                Ok(image) => (
                    Model {
                        capture: ModelCapture::Classifying { request_id },
                        preview: Some(image.clone()),
                        ..model
                    },
                    vec![Effect::Classify { request_id, image }],
                ),
                Err(error) => (
                    Model {
                        capture: ModelCapture::Idle,
                        text: error.to_string(),
                        ..model
                    },
                    vec![],
                ),
            }
        }

        (ModelCapture::Classifying { request_id: active }, Msg::ClassifyDone { request_id, result })
            if active == request_id =>
        {
            let text = match result {
                Ok(classification) => classification.to_string(),
                Err(error) => error.to_string(),
            };
            (
                Model {
                    capture: ModelCapture::Idle,
                    text,
                    ..model
                },
                vec![],
            )
        }

        // Completions for a capture that is no longer active.
        (_, _) => (model, vec![]),
    }
}
