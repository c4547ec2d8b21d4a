pub mod fixture;

#[cfg(test)]
mod collections;
