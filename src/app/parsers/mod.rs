// Page parsers are synchronous: each takes the fetched body and returns owned listings.

pub mod bb;
pub mod bridely;
