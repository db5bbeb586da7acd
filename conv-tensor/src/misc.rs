use super::*;

impl<T: Element> PartialEq for ImageView<T> {
    /// Views are equal when their logical shapes and logical values match, however they were
    /// derived.
    fn eq(&self, other: &Self) -> bool {
        self.channels() == other.channels()
            && self.extent() == other.extent()
            && self.values().eq(other.values())
    }
}

impl<T: Element> PartialEq for FilterView<T> {
    fn eq(&self, other: &Self) -> bool {
        self.out_channels() == other.out_channels()
            && self.in_channels() == other.in_channels()
            && self.extent() == other.extent()
            && self.values().eq(other.values())
    }
}

impl<T: Element> fmt::Debug for ImageView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageView")
            .field("channels", &self.channels())
            .field("extent", &self.extent())
            .field("lineage", &self.lineage())
            .field("elements", &self.values().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: Element> fmt::Debug for FilterView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterView")
            .field("out_channels", &self.out_channels())
            .field("in_channels", &self.in_channels())
            .field("extent", &self.extent())
            .field("lineage", &self.lineage())
            .field("elements", &self.values().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: Element> fmt::Debug for MatrixView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixView")
            .field("rows", &self.rows())
            .field("cols", &self.cols())
            .field("geometry", &self.geometry())
            .finish()
    }
}
