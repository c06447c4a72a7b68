/// Posts shown on one feed page.
pub(crate) const POSTS_PER_PAGE: u32 = 10;

/// Page number as requested by the client, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageRequest(i64);

impl PageRequest {
    pub(crate) fn new(number: i64) -> Self {
        Self(number)
    }

    /// Missing or non-numeric input means the first page.
    pub(crate) fn parse(raw: Option<&str>) -> Self {
        let number = raw
            .and_then(|value| value.trim().parse::<i64>().ok())
            .unwrap_or(1);
        Self::new(number)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Requested page resolved against the size of the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageWindow {
    pub(crate) number: u32,
    pub(crate) per_page: u32,
    pub(crate) num_pages: u32,
}

impl PageWindow {
    /// Pages beyond the last one clamp to the last one, pages below one clamp
    /// to the first. An empty result set still has one (empty) page.
    pub(crate) fn resolve(request: PageRequest, total: i64, per_page: u32) -> Self {
        let per_page = per_page.max(1);
        let total = u64::try_from(total).unwrap_or(0);
        let num_pages = total.div_ceil(u64::from(per_page)).max(1);
        let num_pages = u32::try_from(num_pages).unwrap_or(u32::MAX);

        let number = request.0.clamp(1, i64::from(num_pages));
        let number = u32::try_from(number).unwrap_or(1);

        Self {
            number,
            per_page,
            num_pages,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Page<T> {
    pub(crate) items: Vec<T>,
    pub(crate) number: u32,
    pub(crate) per_page: u32,
    pub(crate) num_pages: u32,
    pub(crate) total: i64,
}

impl<T> Page<T> {
    pub(crate) fn new(items: Vec<T>, window: PageWindow, total: i64) -> Self {
        Self {
            items,
            number: window.number,
            per_page: window.per_page,
            num_pages: window.num_pages,
            total,
        }
    }

    pub(crate) fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub(crate) fn has_next(&self) -> bool {
        self.number < self.num_pages
    }
}
