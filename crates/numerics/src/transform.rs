use crate::error::NumericsError;

/// Reverses the linear order of the slice in place.
pub fn reverse_in_place(data: &mut [f64]) {
    data.reverse();
}

/// Returns a reversed copy of the slice.
pub fn reversed(data: &[f64]) -> Vec<f64> {
    let mut copy = data.to_vec();
    reverse_in_place(&mut copy);
    copy
}

/// `out[i] = a[i] - b[i]`
pub fn subtract_into(a: &[f64], b: &[f64], out: &mut [f64]) -> Result<(), NumericsError> {
    check_lengths("subtract", a.len(), b.len(), out.len())?;
    for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
        *o = x - y;
    }
    Ok(())
}

/// `out[i] = a[i] * b[i]`
pub fn multiply_into(a: &[f64], b: &[f64], out: &mut [f64]) -> Result<(), NumericsError> {
    check_lengths("multiply", a.len(), b.len(), out.len())?;
    for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
        *o = x * y;
    }
    Ok(())
}

/// `out[i] = f(input[i])`
pub fn map_into<F>(input: &[f64], out: &mut [f64], f: F) -> Result<(), NumericsError>
where
    F: Fn(f64) -> f64,
{
    if input.len() != out.len() {
        return Err(NumericsError::LengthMismatch {
            context: "map",
            expected: input.len(),
            found: out.len(),
        });
    }
    for (o, &x) in out.iter_mut().zip(input) {
        *o = f(x);
    }
    Ok(())
}

fn check_lengths(context: &'static str, a: usize, b: usize, out: usize) -> Result<(), NumericsError> {
    if b != a {
        return Err(NumericsError::LengthMismatch { context, expected: a, found: b });
    }
    if out != a {
        return Err(NumericsError::LengthMismatch { context, expected: a, found: out });
    }
    Ok(())
}
