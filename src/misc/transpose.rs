/// Transpose a rectangular grid, `grid[i][j]` becomes `transposed[j][i]`
pub fn transpose<P: Clone>(grid: &[Vec<P>]) -> Vec<Vec<P>> {
    let columns = grid.first().map(|row| row.len()).unwrap_or(0);
    let mut transposed = vec![Vec::with_capacity(grid.len()); columns];
    grid.iter().for_each(|row| {
        row.iter().enumerate().for_each(|(j, p)| {
            transposed[j].push(p.clone());
        })
    });
    transposed
}
