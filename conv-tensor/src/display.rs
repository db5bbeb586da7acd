use super::*;

/// Writes one tab separated row per matrix row.
fn write_grid<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    rows: usize,
    cols: usize,
    value: impl Fn(usize, usize) -> T,
) -> fmt::Result {
    for row in 0..rows {
        for col in 0..cols {
            if col > 0 {
                write!(f, "\t")?;
            }
            write!(f, "{}", value(row, col))?;
        }
        writeln!(f)?;
    }
    Ok(())
}

impl<T: Element> fmt::Display for ImageView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extent = self.extent();
        for channel in 0..self.channels() {
            writeln!(f, "Channel {}:", channel + 1)?;
            write_grid(f, extent.rows, extent.cols, |row, col| {
                self.resolve(channel, row, col)
            })?;
        }
        Ok(())
    }
}

impl<T: Element> fmt::Display for FilterView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extent = self.extent();
        for out_channel in 0..self.out_channels() {
            writeln!(f, "Output channel {}:", out_channel + 1)?;
            for in_channel in 0..self.in_channels() {
                writeln!(f, "Channel {}:", in_channel + 1)?;
                write_grid(f, extent.rows, extent.cols, |row, col| {
                    self.resolve(out_channel, in_channel, row, col)
                })?;
            }
        }
        Ok(())
    }
}

impl<T: Element> fmt::Display for MatrixView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_grid(f, self.rows(), self.cols(), |row, col| self.at(row, col))
    }
}
