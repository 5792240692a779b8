use std::fmt;

/// Implement `Display` for `&[T]` if T is `Display`.
///
/// It outputs at most `max` elements, excluding those from the `max-1`th to
/// the second-to-last one:
/// - `DisplaySlice { slice: &[1,2,3,4,5,6], max: 5 }` outputs:
///   `"[1,2,3,4,..,6]"`.
pub(crate) struct DisplaySlice<'a, T: fmt::Display> {
    pub slice: &'a [T],
    pub max: usize,
}

impl<T: fmt::Display> DisplaySlice<'_, T> {
    /// Set the maximum number of elements to display.
    #[allow(unused)]
    pub fn limit(mut self, max: usize) -> Self {
        self.max = max;
        self
    }
}

impl<T: fmt::Display> fmt::Display for DisplaySlice<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.slice.len();

        write!(f, "[")?;

        if len > self.max && self.max > 1 {
            for (i, t) in self.slice[..(self.max - 1)].iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", t)?;
            }

            write!(f, ",..,")?;
            if let Some(last) = self.slice.last() {
                write!(f, "{}", last)?;
            }
        } else {
            for (i, t) in self.slice.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", t)?;
            }
        }

        write!(f, "]")
    }
}

pub(crate) trait DisplaySliceExt<'a, T: fmt::Display> {
    fn display(&'a self) -> DisplaySlice<'a, T>;
}

impl<T> DisplaySliceExt<'_, T> for [T]
where T: fmt::Display
{
    fn display(&self) -> DisplaySlice<'_, T> {
        DisplaySlice {
            slice: self,
            max: 5,
        }
    }
}
