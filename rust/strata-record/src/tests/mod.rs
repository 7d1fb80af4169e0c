
#[cfg(test)]
mod group;

#[cfg(test)]
mod materializer;
