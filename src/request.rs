use serde_json::{json, Map, Value};

/// Template used by the WebUI text-to-image endpoint when none is given.
pub const TEXT2IMG_TEMPLATE: &str = "e10adc3949ba59abbe56e057f20f883e";
/// Template used by the WebUI image-to-image endpoint when none is given.
pub const IMG2IMG_TEMPLATE: &str = "9c7d531dc75f476aa833b3d452b8f7ad";

/// Builder for a WebUI-style generation body (`text2img`, `img2img` and the
/// ultra variants).
///
/// Produces `{"templateUuid": ..., "generateParams": {...}}`. Parameters not
/// covered by a dedicated setter go through [`param`](Self::param).
///
/// # Example
/// ```
/// use liblibai_rs::GenerateRequest;
///
/// let body = GenerateRequest::text2img("a cat in space")
///     .negative("lowres, blurry")
///     .size(768, 1024)
///     .steps(20)
///     .cfg_scale(7.0)
///     .build();
///
/// assert_eq!(body["generateParams"]["prompt"], "a cat in space");
/// assert_eq!(body["generateParams"]["width"], 768);
/// ```
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub template_uuid: String,
    params: Map<String, Value>,
}

impl GenerateRequest {
    /// Start from a template with no parameters set.
    pub fn new(template_uuid: impl Into<String>) -> Self {
        Self {
            template_uuid: template_uuid.into(),
            params: Map::new(),
        }
    }

    /// Text-to-image with the default template: one image, 512x768,
    /// 20 steps, cfg 7, random seed.
    pub fn text2img(prompt: impl Into<String>) -> Self {
        Self::new(TEXT2IMG_TEMPLATE)
            .prompt(prompt)
            .size(512, 768)
            .steps(20)
            .cfg_scale(7.0)
            .seed(-1)
            .img_count(1)
    }

    /// Image-to-image with the default template, stretching the source to
    /// 1024x1024.
    pub fn img2img(prompt: impl Into<String>, source_image: impl Into<String>) -> Self {
        Self::new(IMG2IMG_TEMPLATE)
            .prompt(prompt)
            .source_image(source_image)
            .resize(0, 1024, 1024)
            .seed(-1)
            .img_count(1)
    }

    pub fn prompt(self, prompt: impl Into<String>) -> Self {
        self.param("prompt", prompt.into())
    }

    pub fn negative(self, prompt: impl Into<String>) -> Self {
        self.param("negativePrompt", prompt.into())
    }

    /// Set the checkpoint (model version uuid).
    pub fn checkpoint(self, id: impl Into<String>) -> Self {
        self.param("checkPointId", id.into())
    }

    pub fn size(self, width: u32, height: u32) -> Self {
        self.param("width", width).param("height", height)
    }

    pub fn steps(self, steps: u32) -> Self {
        self.param("steps", steps)
    }

    pub fn cfg_scale(self, cfg: f64) -> Self {
        self.param("cfgScale", cfg)
    }

    /// Set a specific seed. -1 lets the service pick one.
    pub fn seed(self, seed: i64) -> Self {
        self.param("seed", seed)
    }

    pub fn img_count(self, count: u32) -> Self {
        self.param("imgCount", count)
    }

    /// URL of the input image for image-to-image jobs.
    pub fn source_image(self, url: impl Into<String>) -> Self {
        self.param("sourceImage", url.into())
    }

    /// `mode`: 0 stretch, 1 crop, 2 pad.
    pub fn resize(self, mode: u8, width: u32, height: u32) -> Self {
        self.param("resizeMode", mode)
            .param("resizedWidth", width)
            .param("resizedHeight", height)
    }

    /// Set an arbitrary entry of `generateParams`.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn build(&self) -> Value {
        json!({
            "templateUuid": self.template_uuid,
            "generateParams": self.params,
        })
    }
}

/// Builder for a ComfyUI workflow run body.
///
/// Each node override is keyed by node id:
/// `{"templateUuid": ..., "generateParams": {"12": {"class_type": ..., "inputs": {...}}, "workflowUuid": ...}}`.
#[derive(Debug, Clone)]
pub struct ComfyRequest {
    pub template_uuid: String,
    pub workflow_uuid: Option<String>,
    nodes: Map<String, Value>,
}

impl ComfyRequest {
    pub fn new(template_uuid: impl Into<String>) -> Self {
        Self {
            template_uuid: template_uuid.into(),
            workflow_uuid: None,
            nodes: Map::new(),
        }
    }

    pub fn workflow_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.workflow_uuid = Some(uuid.into());
        self
    }

    /// Override the inputs of one workflow node.
    pub fn node(mut self, node_id: impl Into<String>, class_type: &str, inputs: Value) -> Self {
        self.nodes.insert(
            node_id.into(),
            json!({
                "class_type": class_type,
                "inputs": inputs,
            }),
        );
        self
    }

    pub fn build(&self) -> Value {
        let mut params = self.nodes.clone();
        if let Some(ref uuid) = self.workflow_uuid {
            params.insert("workflowUuid".into(), Value::String(uuid.clone()));
        }
        json!({
            "templateUuid": self.template_uuid,
            "generateParams": params,
        })
    }
}
