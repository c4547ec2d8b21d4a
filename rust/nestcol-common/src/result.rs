pub type Result<T> = std::result::Result<T, crate::error::Error>;

#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

#[macro_export]
macro_rules! verify_data {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_data(result, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[inline]
pub fn verify_data(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_format(name, condition)
    }
}

/// Checks that `index` lies below `bound`, reporting an `OutOfRange` error otherwise.
#[inline]
pub fn verify_index(name: &str, index: u64, bound: u64) -> Result<()> {
    if index < bound {
        Ok(())
    } else {
        out_of_range(name, index, bound)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cold]
pub fn invalid_format(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidFormat {
        element: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cold]
fn out_of_range(name: &str, index: u64, bound: u64) -> Result<()> {
    Err(crate::error::Error::out_of_range(name, index, bound))
}
