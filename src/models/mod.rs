pub mod jobmodel;
pub mod quotemodel;
pub mod usermodel;
