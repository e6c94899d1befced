//! Priority-ordered software compositing.
//!
//! Every registered [`Drawable`] is wrapped in a [`PaintEntry`] and kept in a
//! [`PriorityOrderedList`]. A render pass walks the list from lowest to
//! highest priority and alpha-blends each entry straight into one shared
//! frame buffer, so higher priorities end up on top. There is no depth
//! buffer; the list order is the whole story.

use std::fmt;

use retromode_core::frame::BYTES_PER_PIXEL;
use retromode_core::{
    Color, EngineError, EngineResult, FrameBuffer, Prioritized, PriorityOrderedList, Rgba,
};

/// Something with a position and a picture.
pub trait Drawable {
    fn x(&self) -> i32;
    fn set_x(&mut self, x: i32);
    fn y(&self) -> i32;
    fn set_y(&mut self, y: i32);
    fn image(&self) -> &FrameBuffer;
    fn set_image(&mut self, image: FrameBuffer);

    /// Select an animation frame. Drawables without frames ignore this.
    fn set_frame(&mut self, _frame: usize) -> EngineResult<()> {
        Ok(())
    }
}

/// Stable handle to a registered paint entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaintId(u64);

impl fmt::Display for PaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "paint#{}", self.0)
    }
}

/// A drawable plus the properties the compositor needs to paint it.
pub struct PaintEntry {
    id: PaintId,
    drawable: Box<dyn Drawable>,
    priority: f64,
    visible: bool,
    wrap: bool,
    transparent_key: Rgba,
}

impl PaintEntry {
    /// The transparency key defaults to the image's top-left pixel, so an
    /// empty image is rejected.
    fn new(id: PaintId, drawable: Box<dyn Drawable>, priority: f64) -> EngineResult<Self> {
        let transparent_key = drawable.image().get_pixel(0, 0).ok_or_else(|| {
            EngineError::null_input(format!("{id}: drawable has an empty image"))
        })?;
        Ok(Self {
            id,
            drawable,
            priority,
            visible: true,
            wrap: false,
            transparent_key,
        })
    }

    pub fn id(&self) -> PaintId {
        self.id
    }

    pub fn priority(&self) -> f64 {
        self.priority
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_wrapped(&self) -> bool {
        self.wrap
    }

    pub fn transparent_key(&self) -> Rgba {
        self.transparent_key
    }

    pub fn drawable(&self) -> &dyn Drawable {
        self.drawable.as_ref()
    }

    pub fn drawable_mut(&mut self) -> &mut dyn Drawable {
        self.drawable.as_mut()
    }

    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.visible = visible;
        self
    }

    /// Wrapped entries address the frame toroidally instead of clipping.
    pub fn set_wrapped(&mut self, wrap: bool) -> &mut Self {
        self.wrap = wrap;
        self
    }

    pub fn set_transparent_key(&mut self, key: Rgba) -> &mut Self {
        self.transparent_key = key;
        self
    }

    /// Re-derive the key from the current image's top-left pixel. Left
    /// unchanged if the image is empty.
    pub fn reset_transparent_key(&mut self) -> &mut Self {
        if let Some(px) = self.drawable.image().get_pixel(0, 0) {
            self.transparent_key = px;
        }
        self
    }

    fn paint_onto(&self, frame: &mut FrameBuffer) {
        let (fw, fh) = (frame.width as i64, frame.height as i64);
        if fw == 0 || fh == 0 {
            return;
        }
        let image = self.drawable.image();
        let (ox, oy) = (self.drawable.x() as i64, self.drawable.y() as i64);
        let row_len = image.width as usize;
        if row_len == 0 {
            return;
        }

        for (i, px) in image.data.chunks_exact(BYTES_PER_PIXEL).enumerate() {
            let px: Rgba = [px[0], px[1], px[2], px[3]];
            if px == self.transparent_key {
                continue;
            }
            let mut dx = ox + (i % row_len) as i64;
            let mut dy = oy + (i / row_len) as i64;
            if self.wrap {
                dx = dx.rem_euclid(fw);
                dy = dy.rem_euclid(fh);
            } else if dx < 0 || dy < 0 || dx >= fw || dy >= fh {
                continue;
            }
            frame.blend_pixel(dx as u32, dy as u32, px);
        }
    }
}

impl Prioritized for PaintEntry {
    fn priority(&self) -> f64 {
        self.priority
    }
}

impl PartialEq for PaintEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for PaintEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaintEntry")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("visible", &self.visible)
            .field("wrap", &self.wrap)
            .field("transparent_key", &self.transparent_key)
            .field("x", &self.drawable.x())
            .field("y", &self.drawable.y())
            .finish()
    }
}

/// Composites a priority-ordered set of drawables into a fixed-size frame.
#[derive(Debug)]
pub struct Compositor {
    entries: PriorityOrderedList<PaintEntry>,
    background: Rgba,
    frame: FrameBuffer,
    next_id: u64,
}

impl Compositor {
    /// A compositor whose frames start fully transparent.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            entries: PriorityOrderedList::new(),
            background: [0, 0, 0, 0],
            frame: FrameBuffer::new(width, height),
            next_id: 0,
        }
    }

    pub fn with_background(mut self, color: &Color) -> Self {
        self.set_background(color);
        self
    }

    pub fn set_background(&mut self, color: &Color) {
        self.background = color.to_rgba8();
    }

    pub fn width(&self) -> u32 {
        self.frame.width
    }

    pub fn height(&self) -> u32 {
        self.frame.height
    }

    /// Register a drawable at `priority`. Among equal priorities, later
    /// registrations paint on top of earlier ones.
    pub fn add(
        &mut self,
        drawable: impl Drawable + 'static,
        priority: f64,
    ) -> EngineResult<PaintId> {
        self.add_boxed(Box::new(drawable), priority)
    }

    pub fn add_boxed(
        &mut self,
        drawable: Box<dyn Drawable>,
        priority: f64,
    ) -> EngineResult<PaintId> {
        let id = PaintId(self.next_id);
        let entry = PaintEntry::new(id, drawable, priority)?;
        self.next_id += 1;
        let index = self.entries.insert(entry);
        tracing::debug!(%id, priority, index, "paint entry added");
        Ok(id)
    }

    /// Unregister an entry, handing back its drawable. Unknown ids are ignored.
    pub fn remove(&mut self, id: PaintId) -> Option<Box<dyn Drawable>> {
        let entry = self.entries.remove_first(|e| e.id == id)?;
        tracing::debug!(%id, "paint entry removed");
        Some(entry.drawable)
    }

    pub fn contains(&self, id: PaintId) -> bool {
        self.entry(id).is_some()
    }

    /// Move an entry to a new priority. It becomes the newest among its
    /// equal-priority peers.
    pub fn set_priority(&mut self, id: PaintId, priority: f64) -> bool {
        let Some(mut entry) = self.entries.remove_first(|e| e.id == id) else {
            return false;
        };
        entry.priority = priority;
        self.entries.insert(entry);
        true
    }

    /// Returns `false` if `id` is not registered.
    pub fn set_visible(&mut self, id: PaintId, visible: bool) -> bool {
        self.entry_mut(id).map(|e| e.set_visible(visible)).is_some()
    }

    pub fn set_wrapped(&mut self, id: PaintId, wrap: bool) -> bool {
        self.entry_mut(id).map(|e| e.set_wrapped(wrap)).is_some()
    }

    /// `None` re-derives the key from the drawable's current top-left pixel.
    pub fn set_transparent_key(&mut self, id: PaintId, key: Option<Rgba>) -> bool {
        self.entry_mut(id)
            .map(|e| match key {
                Some(key) => e.set_transparent_key(key),
                None => e.reset_transparent_key(),
            })
            .is_some()
    }

    pub fn entry(&self, id: PaintId) -> Option<&PaintEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entry_mut(&mut self, id: PaintId) -> Option<&mut PaintEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn drawable(&self, id: PaintId) -> Option<&dyn Drawable> {
        self.entry(id).map(PaintEntry::drawable)
    }

    pub fn drawable_mut(&mut self, id: PaintId) -> Option<&mut dyn Drawable> {
        self.entry_mut(id).map(PaintEntry::drawable_mut)
    }

    /// Entries in paint order (ascending priority).
    pub fn entries(&self) -> impl Iterator<Item = &PaintEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Produce a new frame: clear to the background, then blend every
    /// visible entry in ascending priority order.
    pub fn render(&mut self) -> &FrameBuffer {
        self.frame.fill(self.background);
        let mut painted = 0usize;
        for entry in self.entries.iter().filter(|e| e.visible) {
            entry.paint_onto(&mut self.frame);
            painted += 1;
        }
        tracing::trace!(painted, total = self.entries.len(), "frame composited");
        &self.frame
    }

    /// The most recently rendered frame.
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }
}
