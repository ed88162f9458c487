use lightbox_common::SurfaceSize;
use std::cell::Cell;
use std::rc::Rc;

/// The layout element that contains the drawable surface.
///
/// Dimensions are read on demand every time; implementations must not cache.
pub trait SurfaceHost {
    fn dimensions(&self) -> SurfaceSize;
}

impl<H: SurfaceHost + ?Sized> SurfaceHost for &H {
    fn dimensions(&self) -> SurfaceSize {
        (**self).dimensions()
    }
}

/// A host-owned size cell. Clones share the same size, so a test or headless
/// host can resize "the window" while the coordinator holds its binding.
#[derive(Debug, Clone)]
pub struct SharedSurface(Rc<Cell<SurfaceSize>>);

impl SharedSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self(Rc::new(Cell::new(size)))
    }

    pub fn set(&self, size: SurfaceSize) {
        self.0.set(size);
    }
}

impl SurfaceHost for SharedSurface {
    fn dimensions(&self) -> SurfaceSize {
        self.0.get()
    }
}

/// Binds a drawable surface to the layout element hosting it.
#[derive(Debug, Clone)]
pub struct SurfaceBinding<H> {
    label: String,
    host: H,
}

impl<H: SurfaceHost> SurfaceBinding<H> {
    pub fn new(label: impl Into<String>, host: H) -> Self {
        Self {
            label: label.into(),
            host,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Current pixel dimensions of the containing element.
    pub fn dimensions(&self) -> SurfaceSize {
        self.host.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_reads_host_every_time() {
        let host = SharedSurface::new(SurfaceSize::new(800, 600));
        let binding = SurfaceBinding::new("canvas", host.clone());
        assert_eq!(binding.dimensions(), SurfaceSize::new(800, 600));
        host.set(SurfaceSize::new(1024, 768));
        assert_eq!(binding.dimensions(), SurfaceSize::new(1024, 768));
        assert_eq!(binding.label(), "canvas");
    }

    #[test]
    fn reference_is_a_host() {
        let host = SharedSurface::new(SurfaceSize::new(1, 2));
        let binding = SurfaceBinding::new("ref", &host);
        assert_eq!(binding.dimensions(), SurfaceSize::new(1, 2));
    }
}
