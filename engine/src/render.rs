use serde::{Deserialize, Serialize};

/// Screen-space position in pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Opaque index into the host's texture database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// Name-to-handle registry. The host loads the actual image data; game code
/// only ever resolves keys to handles.
#[derive(Debug, Clone, Default)]
pub struct TextureDb {
    keys: Vec<String>,
}

impl TextureDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a key and returns its handle. Registering a key twice
    /// returns the existing handle.
    pub fn add(&mut self, key: &str) -> TextureHandle {
        if let Some(handle) = self.find(key) {
            return handle;
        }
        self.keys.push(key.to_owned());
        TextureHandle((self.keys.len() - 1) as u32)
    }

    pub fn find(&self, key: &str) -> Option<TextureHandle> {
        self.keys
            .iter()
            .position(|k| k == key)
            .map(|i| TextureHandle(i as u32))
    }

    pub fn key(&self, handle: TextureHandle) -> Option<&str> {
        self.keys.get(handle.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// One sprite draw request for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteSubmission {
    pub handle: TextureHandle,
    pub position: Vec2,
    pub scale: Vec2,
    pub depth: f32,
    pub alpha: f32,
}

/// Per-frame sprite accumulator. Game code resets it, fills it, and the host
/// draws whatever ended up inside, lower depth first.
#[derive(Debug, Clone, Default)]
pub struct SpriteBatch {
    submissions: Vec<SpriteSubmission>,
}

impl SpriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.submissions.clear();
    }

    pub fn add(&mut self, handle: TextureHandle, position: Vec2, scale: Vec2, depth: f32, alpha: f32) {
        self.submissions.push(SpriteSubmission {
            handle,
            position,
            scale,
            depth,
            alpha,
        });
    }

    pub fn submissions(&self) -> &[SpriteSubmission] {
        &self.submissions
    }

    /// Submissions in draw order: lower depth values draw first.
    pub fn draw_order(&self) -> Vec<&SpriteSubmission> {
        let mut ordered: Vec<&SpriteSubmission> = self.submissions.iter().collect();
        ordered.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        ordered
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }
}

/// One text draw request for the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSubmission {
    pub position: Vec2,
    pub scale: f32,
    pub font: String,
    pub text: String,
}

/// Per-frame text accumulator, same lifecycle as [`SpriteBatch`].
#[derive(Debug, Clone, Default)]
pub struct TextBatch {
    submissions: Vec<TextSubmission>,
}

impl TextBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.submissions.clear();
    }

    pub fn add(&mut self, position: Vec2, scale: f32, font: &str, text: impl Into<String>) {
        self.submissions.push(TextSubmission {
            position,
            scale,
            font: font.to_owned(),
            text: text.into(),
        });
    }

    pub fn submissions(&self) -> &[TextSubmission] {
        &self.submissions
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }
}
