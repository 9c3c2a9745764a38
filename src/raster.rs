//!
//! The offscreen pixel raster frames are copied into before decoding
//!

/// An RGBA pixel raster holding the most recent camera frame
///
/// The scan loop resizes this to the source frame's dimensions on every ready
/// tick and overwrites the contents in place. There is no retained history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    /// Resize to the given frame dimensions, reusing the allocation when possible
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.resize(width as usize * height as usize * 4, 0);
    }

    /// Resize to the frame's dimensions and overwrite the contents
    pub fn fill_from(&mut self, pixels: &[u8], width: u32, height: u32) {
        self.resize(width, height);
        let len = self.data.len().min(pixels.len());
        self.data[..len].copy_from_slice(&pixels[..len]);
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major, 4 bytes per pixel
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Default for Raster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let raster = Raster::new();
        assert_eq!(raster.dimensions(), (0, 0));
        assert!(raster.data().is_empty());
    }

    #[test]
    fn resize_tracks_dimensions() {
        let mut raster = Raster::new();
        raster.resize(640, 480);
        assert_eq!(raster.dimensions(), (640, 480));
        assert_eq!(raster.data().len(), 640 * 480 * 4);

        // shrinking reuses the allocation and keeps len consistent
        raster.resize(320, 240);
        assert_eq!(raster.data().len(), 320 * 240 * 4);
    }

    #[test]
    fn fill_overwrites_in_place() {
        let mut raster = Raster::new();
        let frame = vec![0xABu8; 2 * 2 * 4];
        raster.fill_from(&frame, 2, 2);
        assert_eq!(raster.dimensions(), (2, 2));
        assert!(raster.data().iter().all(|&b| b == 0xAB));
    }
}
