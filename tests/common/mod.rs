/// Runs a program from `tests/programs/<scope>/<name>.il` through the `il`
/// binary and asserts on its output.
///
/// `OK` expects the given stdout lines and a zero exit code. `ERR` expects
/// the given stderr lines and a nonzero exit code.
#[macro_export]
macro_rules! tests {
    ($file:ident in $scope:ident is OK $($expected:expr)*) => {
        #[test]
        fn $file() {
            use assert_cmd::Command;

            let mut expected = vec![$($expected),*];

            // if exists, concat expected lines with new lines
            let expected: String = match expected.len() {
                0 => "".to_string(),
                _ => {
                    // add empty string to end to add new line to end of output
                    expected.push("");
                    expected.join("\n")
                }
            };

            let file = format!("tests/programs/{}/{}.il", stringify!($scope), stringify!($file));

            Command::cargo_bin("il").unwrap()
                .arg(file)
                .assert()
                .stdout(expected)
                .success();
        }
    };

    ($file:ident in $scope:ident is ERR $($expected:expr)+) => {
        #[test]
        fn $file() {
            use assert_cmd::Command;

            // output concats expected with new line
            let output = vec![$($expected),+].join("\n");
            let file = format!("tests/programs/{}/{}.il", stringify!($scope), stringify!($file));

            Command::cargo_bin("il").unwrap()
                .arg(file)
                .assert()
                .stderr(format!("{output}\n"))
                .failure();
        }
    };
}
