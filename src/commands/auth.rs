use std::path::Path;

use taskbuddy::auth::SignInRequest;
use taskbuddy::error::Result;

use super::{open_session, print_json};

pub fn login(
    db_path: &Path,
    name: &str,
    email: &str,
    avatar: Option<&str>,
    json: bool,
) -> Result<()> {
    let session = open_session(db_path)?;
    let user = session.sign_in(&SignInRequest {
        name: name.to_string(),
        email: email.to_string(),
        avatar_url: avatar.map(str::to_string),
    })?;

    if json {
        print_json(&user)
    } else {
        println!("Signed in as {} <{}>", user.display_name, user.email);
        Ok(())
    }
}

pub fn logout(db_path: &Path) -> Result<()> {
    open_session(db_path)?.sign_out()?;
    println!("Signed out");
    Ok(())
}

pub fn whoami(db_path: &Path, json: bool) -> Result<()> {
    let user = open_session(db_path)?.current_user();
    match (user, json) {
        (Some(user), true) => print_json(&user),
        (None, true) => print_json(&serde_json::Value::Null),
        (Some(user), false) => {
            println!("{} <{}>", user.display_name, user.email);
            if let Some(url) = &user.avatar_url {
                println!("avatar: {url}");
            }
            Ok(())
        }
        (None, false) => {
            println!("Not signed in.");
            Ok(())
        }
    }
}
